//! Header rows of a CSV export.
//!
//! Form exports either carry one header row, or the full question text on
//! row 1 with short column names on row 2. The question text still helps
//! the header mapper when a short name is too terse to match.

/// Column names of a CSV file, plus the question row when there is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvHeaders {
    pub columns: Vec<String>,
    pub questions: Option<Vec<String>>,
}

impl CsvHeaders {
    pub fn new(columns: Vec<String>, questions: Option<Vec<String>>) -> Self {
        Self { columns, questions }
    }

    /// Rows before the first data row.
    pub fn header_rows(&self) -> usize {
        if self.questions.is_some() { 2 } else { 1 }
    }

    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions
            .as_ref()?
            .get(index)
            .map(String::as_str)
            .filter(|question| !question.is_empty())
    }
}

/// Text the header mapper sees for each column: the column name, followed
/// by its question when one exists.
pub fn mapping_headers(columns: &[String], questions: Option<&[String]>) -> Vec<String> {
    columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            match questions
                .and_then(|questions| questions.get(index))
                .filter(|question| !question.is_empty() && *question != name)
            {
                Some(question) => format!("{name} {question}"),
                None => name.clone(),
            }
        })
        .collect()
}

/// Trims whitespace and a leading byte order mark.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}

/// Splits one header line into normalized cells.
///
/// Quoted cells may contain commas; `""` inside quotes is a literal quote.
pub fn split_header_line(line: &str) -> Vec<String> {
    let mut cells = vec![String::new()];
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        let Some(cell) = cells.last_mut() else {
            break;
        };
        match (c, quoted) {
            ('"', false) => quoted = true,
            ('"', true) if chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            ('"', true) => quoted = false,
            (',', false) => cells.push(String::new()),
            _ => cell.push(c),
        }
    }
    cells.iter().map(|cell| normalize_header(cell)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_row_extends_mapping_text() {
        let columns = vec!["A".to_string(), "연락처".to_string(), "URL".to_string()];
        let questions = vec![
            "● 성함 (닉네임)".to_string(),
            "연락처".to_string(),
            String::new(),
        ];
        assert_eq!(
            mapping_headers(&columns, Some(&questions)),
            vec!["A ● 성함 (닉네임)", "연락처", "URL"]
        );
        assert_eq!(mapping_headers(&columns, None), columns);
    }

    #[test]
    fn test_question_lookup() {
        let headers = CsvHeaders::new(
            vec!["연락처".to_string(), "x".to_string()],
            Some(vec!["● 연락처 ( 예- 01021456993 )".to_string(), String::new()]),
        );
        assert_eq!(headers.header_rows(), 2);
        assert_eq!(headers.question(0), Some("● 연락처 ( 예- 01021456993 )"));
        assert_eq!(headers.question(1), None);
        assert_eq!(CsvHeaders::new(Vec::new(), None).header_rows(), 1);
    }

    #[test]
    fn test_split_quoted_question_text() {
        let result = split_header_line("\"● 희망상품(복수 신청가능)\",\"● 성함, 닉네임\",URL");
        assert_eq!(result, vec!["● 희망상품(복수 신청가능)", "● 성함, 닉네임", "URL"]);
    }

    #[test]
    fn test_split_escaped_quotes_and_padding() {
        assert_eq!(
            split_header_line("\"say \"\"hi\"\"\" ,  b  "),
            vec!["say \"hi\"", "b"]
        );
        assert_eq!(split_header_line("\u{feff}a,"), vec!["a", ""]);
    }
}
