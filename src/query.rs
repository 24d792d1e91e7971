//! Listing filters and the query strings they become.
//!
//! Every filter is a closed set of values. Anything outside the set is
//! rejected while parsing arguments, before a request exists.

use std::collections::BTreeMap;

use clap::{Args, ValueEnum};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Wire name of a filter value: the same kebab-case name clap accepts.
fn wire<T: ValueEnum>(value: &T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Difficulty {
    VeryEasy,
    Easy,
    Medium,
    Hard,
    Insane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Status {
    Active,
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortType {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineOs {
    Linux,
    Windows,
    Freebsd,
    Openbsd,
    Android,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MachineSort {
    ReleaseDate,
    Name,
    Rating,
    UserOwns,
    SystemOwns,
    Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChallengeSort {
    ReleaseDate,
    Name,
    Rating,
    Solves,
    Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChallengeCategory {
    Reversing,
    Crypto,
    Stego,
    Pwn,
    Web,
    Misc,
    Forensics,
    Mobile,
    Osint,
    Hardware,
    Gamepwn,
    Blockchain,
    Ai,
    Coding,
    SecureCoding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SherlockCategory {
    Dfir,
    Soc,
    MalwareAnalysis,
    ThreatIntelligence,
    ThreatHunting,
    Cloud,
    Ics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SherlockSort {
    ReleaseDate,
    Name,
    Rating,
    Solves,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Paging {
    /// Page number
    #[arg(long, default_value_t = DEFAULT_PAGE, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Results per page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE, value_parser = clap::value_parser!(u32).range(1..))]
    pub per_page: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Query-string builder; keys are unique, the last write wins.
#[derive(Debug, Default)]
struct QueryBuilder(BTreeMap<String, String>);

impl QueryBuilder {
    fn paging(mut self, paging: &Paging) -> Self {
        self.0.insert("page".into(), paging.page.to_string());
        self.0.insert("per_page".into(), paging.per_page.to_string());
        self
    }

    fn choice<T: ValueEnum>(mut self, key: &str, value: Option<&T>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.into(), wire(value));
        }
        self
    }

    fn text(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.0.insert(key.into(), value.to_string());
        }
        self
    }

    fn build(self) -> BTreeMap<String, String> {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct MachineFilters {
    /// Machine status
    #[arg(long, value_enum)]
    pub status: Option<Status>,

    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,

    /// Operating system
    #[arg(long, value_enum)]
    pub os: Option<MachineOs>,

    #[arg(long, value_enum)]
    pub sort_by: Option<MachineSort>,

    #[arg(long, value_enum)]
    pub sort_type: Option<SortType>,

    /// Free-text search on the machine name
    #[arg(long)]
    pub keyword: Option<String>,

    #[command(flatten)]
    pub paging: Paging,
}

impl MachineFilters {
    pub fn to_query(&self) -> BTreeMap<String, String> {
        QueryBuilder::default()
            .choice("status", self.status.as_ref())
            .choice("difficulty", self.difficulty.as_ref())
            .choice("os", self.os.as_ref())
            .choice("sort_by", self.sort_by.as_ref())
            .choice("sort_type", self.sort_type.as_ref())
            .text("keyword", self.keyword.as_deref())
            .paging(&self.paging)
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct ChallengeFilters {
    #[arg(long, value_enum)]
    pub status: Option<Status>,

    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,

    #[arg(long, value_enum)]
    pub category: Option<ChallengeCategory>,

    #[arg(long, value_enum)]
    pub sort_by: Option<ChallengeSort>,

    #[arg(long, value_enum)]
    pub sort_type: Option<SortType>,

    #[arg(long)]
    pub keyword: Option<String>,

    #[command(flatten)]
    pub paging: Paging,
}

impl ChallengeFilters {
    pub fn to_query(&self) -> BTreeMap<String, String> {
        QueryBuilder::default()
            .choice("status", self.status.as_ref())
            .choice("difficulty", self.difficulty.as_ref())
            .choice("category", self.category.as_ref())
            .choice("sort_by", self.sort_by.as_ref())
            .choice("sort_type", self.sort_type.as_ref())
            .text("keyword", self.keyword.as_deref())
            .paging(&self.paging)
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct SherlockFilters {
    #[arg(long, value_enum)]
    pub status: Option<Status>,

    #[arg(long, value_enum)]
    pub difficulty: Option<Difficulty>,

    #[arg(long, value_enum)]
    pub category: Option<SherlockCategory>,

    #[arg(long, value_enum)]
    pub sort_by: Option<SherlockSort>,

    #[arg(long, value_enum)]
    pub sort_type: Option<SortType>,

    #[arg(long)]
    pub keyword: Option<String>,

    #[command(flatten)]
    pub paging: Paging,
}

impl SherlockFilters {
    pub fn to_query(&self) -> BTreeMap<String, String> {
        QueryBuilder::default()
            .choice("status", self.status.as_ref())
            .choice("difficulty", self.difficulty.as_ref())
            .choice("category", self.category.as_ref())
            .choice("sort_by", self.sort_by.as_ref())
            .choice("sort_type", self.sort_type.as_ref())
            .text("keyword", self.keyword.as_deref())
            .paging(&self.paging)
            .build()
    }
}
