//! Template table
//!
//! The fixed set of format identifiers, their strftime patterns, and the
//! pre-parsed table built from them at startup.

use std::fmt;
use std::str::FromStr;

use chrono::format::{Item, StrftimeItems};

use crate::error::FormatError;

/// A template identifier accepted by the `get_datetime` tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatId {
    Date,
    DateSlash,
    DateJp,
    Datetime,
    DatetimeJp,
    DatetimeT,
    Compact,
    CompactDate,
    CompactTime,
    FilenameMd,
    FilenameTxt,
    FilenameLog,
    Iso,
    IsoBasic,
    Log,
    LogCompact,
    Time,
    TimeJp,
}

impl FormatId {
    /// Every identifier, in table order
    pub const ALL: [FormatId; 18] = [
        FormatId::Date,
        FormatId::DateSlash,
        FormatId::DateJp,
        FormatId::Datetime,
        FormatId::DatetimeJp,
        FormatId::DatetimeT,
        FormatId::Compact,
        FormatId::CompactDate,
        FormatId::CompactTime,
        FormatId::FilenameMd,
        FormatId::FilenameTxt,
        FormatId::FilenameLog,
        FormatId::Iso,
        FormatId::IsoBasic,
        FormatId::Log,
        FormatId::LogCompact,
        FormatId::Time,
        FormatId::TimeJp,
    ];

    /// Wire name of the identifier
    pub fn as_str(self) -> &'static str {
        match self {
            FormatId::Date => "date",
            FormatId::DateSlash => "date_slash",
            FormatId::DateJp => "date_jp",
            FormatId::Datetime => "datetime",
            FormatId::DatetimeJp => "datetime_jp",
            FormatId::DatetimeT => "datetime_t",
            FormatId::Compact => "compact",
            FormatId::CompactDate => "compact_date",
            FormatId::CompactTime => "compact_time",
            FormatId::FilenameMd => "filename_md",
            FormatId::FilenameTxt => "filename_txt",
            FormatId::FilenameLog => "filename_log",
            FormatId::Iso => "iso",
            FormatId::IsoBasic => "iso_basic",
            FormatId::Log => "log",
            FormatId::LogCompact => "log_compact",
            FormatId::Time => "time",
            FormatId::TimeJp => "time_jp",
        }
    }

    /// strftime pattern rendered for this identifier
    pub fn pattern(self) -> &'static str {
        match self {
            FormatId::Date => "%Y-%m-%d",
            FormatId::DateSlash => "%Y/%m/%d",
            FormatId::DateJp => "%Y年%m月%d日",
            FormatId::Datetime => "%Y-%m-%d %H:%M:%S",
            FormatId::DatetimeJp => "%Y年%m月%d日 %H時%M分%S秒",
            FormatId::DatetimeT => "%Y-%m-%dT%H:%M:%S",
            FormatId::Compact => "%Y%m%d%H%M%S",
            FormatId::CompactDate => "%Y%m%d",
            FormatId::CompactTime => "%H%M%S",
            FormatId::FilenameMd => "%Y%m%d%H%M%S.md",
            FormatId::FilenameTxt => "%Y%m%d%H%M%S.txt",
            FormatId::FilenameLog => "%Y%m%d%H%M%S.log",
            FormatId::Iso => "%Y-%m-%dT%H:%M:%S%z",
            FormatId::IsoBasic => "%Y%m%dT%H%M%S%z",
            FormatId::Log => "%Y-%m-%d %H:%M:%S%.6f",
            FormatId::LogCompact => "%Y%m%d_%H%M%S",
            FormatId::Time => "%H:%M:%S",
            FormatId::TimeJp => "%H時%M分%S秒",
        }
    }

    /// Output for 2024-12-10 00:54:01.123456 +09:00, shown in the tool schema
    pub fn example(self) -> &'static str {
        match self {
            FormatId::Date => "2024-12-10",
            FormatId::DateSlash => "2024/12/10",
            FormatId::DateJp => "2024年12月10日",
            FormatId::Datetime => "2024-12-10 00:54:01",
            FormatId::DatetimeJp => "2024年12月10日 00時54分01秒",
            FormatId::DatetimeT => "2024-12-10T00:54:01",
            FormatId::Compact => "20241210005401",
            FormatId::CompactDate => "20241210",
            FormatId::CompactTime => "005401",
            FormatId::FilenameMd => "20241210005401.md",
            FormatId::FilenameTxt => "20241210005401.txt",
            FormatId::FilenameLog => "20241210005401.log",
            FormatId::Iso => "2024-12-10T00:54:01+0900",
            FormatId::IsoBasic => "20241210T005401+0900",
            FormatId::Log => "2024-12-10 00:54:01.123456",
            FormatId::LogCompact => "20241210_005401",
            FormatId::Time => "00:54:01",
            FormatId::TimeJp => "00時54分01秒",
        }
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for FormatId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormatId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| FormatError::UnknownFormat {
                format: s.to_string(),
            })
    }
}

/// A pattern parsed once into chrono format items
#[derive(Debug, Clone)]
pub struct Template {
    pub id: FormatId,
    pub pattern: &'static str,
    items: Vec<Item<'static>>,
}

impl Template {
    fn parse(id: FormatId) -> Result<Self, FormatError> {
        let pattern = id.pattern();
        let items: Vec<Item<'static>> = StrftimeItems::new(pattern).collect();

        if items.iter().any(|item| matches!(item, Item::Error)) {
            return Err(FormatError::InvalidTemplate {
                format: id.as_str().to_string(),
                pattern: pattern.to_string(),
            });
        }

        Ok(Self { id, pattern, items })
    }

    pub(crate) fn items(&self) -> &[Item<'static>] {
        &self.items
    }
}

/// Immutable identifier -> template mapping, validated on construction
#[derive(Debug, Clone)]
pub struct TemplateTable {
    templates: Vec<Template>,
}

impl TemplateTable {
    /// Build the table, parsing every pattern up front
    pub fn new() -> Result<Self, FormatError> {
        let templates = FormatId::ALL
            .into_iter()
            .map(Template::parse)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { templates })
    }

    /// Look up a template by its wire name
    pub fn get(&self, format: &str) -> Result<&Template, FormatError> {
        let id: FormatId = format.parse()?;
        Ok(self.template(id))
    }

    /// Look up a template by identifier
    pub fn template(&self, id: FormatId) -> &Template {
        // Built from FormatId::ALL, so the index always matches.
        &self.templates[id as usize]
    }

    /// Iterate templates in table order
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_builds() {
        let table = TemplateTable::new().unwrap();
        assert_eq!(table.len(), FormatId::ALL.len());
    }

    #[test]
    fn test_table_order_matches_ids() {
        let table = TemplateTable::new().unwrap();
        for (template, id) in table.iter().zip(FormatId::ALL) {
            assert_eq!(template.id, id);
            assert_eq!(table.template(id).pattern, id.pattern());
        }
    }

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = FormatId::ALL.iter().map(|id| id.as_str()).collect();
        assert_eq!(names.len(), FormatId::ALL.len());
    }

    #[test]
    fn test_parse_round_trip() {
        for id in FormatId::ALL {
            assert_eq!(id.as_str().parse::<FormatId>().unwrap(), id);
        }
    }

    #[test]
    fn test_unknown_format() {
        let table = TemplateTable::new().unwrap();
        let err = table.get("bogus").unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownFormat {
                format: "bogus".to_string()
            }
        );
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert!("ISO".parse::<FormatId>().is_err());
        assert!(" iso".parse::<FormatId>().is_err());
    }
}
