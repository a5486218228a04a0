use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchoolLevel {
    #[default]
    Elementary,
    Middle,
    High,
}

impl SchoolLevel {
    /// Parse the directory's school kind name (e.g. `중학교`).
    pub fn from_kind_name(kind: &str) -> Self {
        match kind.trim() {
            "중학교" => SchoolLevel::Middle,
            "고등학교" => SchoolLevel::High,
            _ => SchoolLevel::Elementary,
        }
    }

    /// Education data service that publishes this level's timetables.
    pub fn timetable_service(self) -> &'static str {
        match self {
            SchoolLevel::Elementary => "elsTimetable",
            SchoolLevel::Middle => "misTimetable",
            SchoolLevel::High => "hisTimetable",
        }
    }
}

/// The student's school, grade and class.
///
/// Field names on the wire match the settings written by earlier clients
/// (`regionCode`, `class`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolIdentity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub region_code: String,
    #[serde(default)]
    pub region_name: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default, rename = "class")]
    pub class_section: String,
    #[serde(default)]
    pub level: SchoolLevel,
}

impl SchoolIdentity {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        region_code: impl Into<String>,
        region_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            region_code: region_code.into(),
            region_name: region_name.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, grade: impl Into<String>, class_section: impl Into<String>) -> Self {
        self.grade = grade.into();
        self.class_section = class_section.into();
        self
    }

    pub fn with_level(mut self, level: SchoolLevel) -> Self {
        self.level = level;
        self
    }

    /// Nothing is fetched until both the school code and region code are set.
    pub fn is_complete(&self) -> bool {
        !self.code.trim().is_empty() && !self.region_code.trim().is_empty()
    }

    pub fn share_title(&self) -> String {
        format!("{} {}학년 {}반 정보", self.name, self.grade, self.class_section)
    }
}
