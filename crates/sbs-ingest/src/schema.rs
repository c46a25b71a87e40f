//! Header mapping.
//!
//! Runs once per import. Long form-question headers are first shortened
//! through an alias table, then keyword rules pick the column for each
//! designated field. The result is a [`FieldMap`]; nothing after this step
//! looks at header text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use sbs_model::{Field, FieldMap};

/// Keywords selecting one field's column. Matching is a case-insensitive
/// substring test on the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderRule {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl HeaderRule {
    pub fn new(include: &[&str], exclude: &[&str]) -> Self {
        Self {
            include: include.iter().map(ToString::to_string).collect(),
            exclude: exclude.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn matches(&self, header: &str) -> bool {
        let header = header.to_lowercase();
        let hit = |keyword: &String| header.contains(&keyword.to_lowercase());
        self.include.iter().any(hit) && !self.exclude.iter().any(hit)
    }
}

/// Keyword rules for every designated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderRules {
    pub contact: HeaderRule,
    pub name: HeaderRule,
    pub category: HeaderRule,
    pub channel: HeaderRule,
    pub url: HeaderRule,
}

impl Default for HeaderRules {
    /// Rules for the Korean campaign application form.
    fn default() -> Self {
        Self {
            contact: HeaderRule::new(&["연락처", "전화", "phone", "contact"], &["카톡", "아이디"]),
            name: HeaderRule::new(&["성함", "이름", "닉네임", "name"], &[]),
            category: HeaderRule::new(&["희망상품", "희망 상품", "product"], &[]),
            channel: HeaderRule::new(&["채널", "channel"], &[]),
            url: HeaderRule::new(&["url", "계정 링크", "블로그"], &[]),
        }
    }
}

impl HeaderRules {
    pub fn rule(&self, field: Field) -> &HeaderRule {
        match field {
            Field::Contact => &self.contact,
            Field::Name => &self.name,
            Field::Category => &self.category,
            Field::Channel => &self.channel,
            Field::Url => &self.url,
        }
    }
}

/// Default aliases: question text fragment -> short column name.
pub fn default_aliases() -> BTreeMap<String, String> {
    [
        ("● 희망상품(복수 신청가능)", "희망상품"),
        ("● 신청 채널을 선택해주세요.", "신청채널"),
        ("● 계정 링크 입력해주세요 (블로그 및 인스타 주소)", "URL"),
        ("● 팔로워수 혹은 평균 일 방문자수 선택", "일방문 및 팔로워수"),
        ("● 이웃활동을 열심히 하시는 편이신가요?", "이웃활동"),
        ("● 성함 (닉네임) --- ex) 홍길동 (해운대럭키가이)", "이름 및 닉네임"),
        ("● 연락처 ( 예- 01021456993 )", "연락처"),
        ("● 카톡아이디(연락처 오입력 시 연락)", "카톡아이디"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}

/// Renames the first column containing each alias key.
pub fn apply_aliases(columns: &mut [String], aliases: &BTreeMap<String, String>) {
    for (fragment, short) in aliases {
        if let Some(column) = columns.iter_mut().find(|column| column.contains(fragment.as_str())) {
            tracing::trace!(from = %column, to = %short, "header alias applied");
            *column = short.clone();
        }
    }
}

/// Outcome of the mapping step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingReport {
    pub fields: FieldMap,
    /// Fields with no matching column. Dependent features pass through.
    pub gaps: Vec<Field>,
}

impl MappingReport {
    pub fn is_complete(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Logs one warning per gap.
    pub fn warn_gaps(&self) {
        for field in &self.gaps {
            let effect = match field {
                Field::Contact => "contact dedup disabled",
                Field::Category => "category filter and tabs disabled",
                Field::Channel => "channel filter disabled",
                Field::Name | Field::Url => "excluded from search",
            };
            tracing::warn!(field = field.as_str(), effect, "no column found for field");
        }
    }
}

/// Picks the first matching column for each field. A column serves at most
/// one field; fields are resolved in [`Field::ALL`] order.
pub fn detect_fields(columns: &[String], rules: &HeaderRules) -> MappingReport {
    let mut fields = FieldMap::default();
    let mut taken = vec![false; columns.len()];
    for field in Field::ALL {
        let rule = rules.rule(field);
        let found = columns
            .iter()
            .enumerate()
            .find(|(idx, header)| !taken[*idx] && rule.matches(header))
            .map(|(idx, _)| idx);
        if let Some(idx) = found {
            taken[idx] = true;
        }
        fields.set(field, found);
    }
    MappingReport {
        gaps: fields.missing(),
        fields,
    }
}
