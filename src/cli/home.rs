use clap::Subcommand;

use crate::api::catalog::ChangelogResponse;
use crate::api::home::{self, Banner, Notice, NoticeResponse};
use crate::cli::Context;
use crate::error::Result;
use crate::format::{build_panel, build_table, cell, date_cell, yes_no};

#[derive(Subcommand)]
pub enum HomeAction {
    /// Dashboard banner
    Banner,
    /// Banner announcement
    Announcement,
    /// Latest platform changes
    Changelog,
    /// Banner notice
    Notice,
}

pub fn notice_lines(title: &str, notice: Option<Notice>) -> Vec<String> {
    let Some(n) = notice else {
        return vec![title.to_string(), "No results.".to_string()];
    };
    build_panel(
        title,
        &[
            ("Title", cell(n.title.as_deref())),
            ("Message", cell(n.message.as_deref())),
            ("Type", cell(n.kind.as_deref())),
            ("Date", date_cell(n.when())),
            ("Priority", cell(n.priority.as_deref())),
            ("Active", yes_no(n.active)),
        ],
    )
}

pub fn execute(ctx: &Context, action: HomeAction) -> Result<()> {
    let (banner, title) = match action {
        HomeAction::Banner => (Banner::Main, "Banner"),
        HomeAction::Announcement => (Banner::Announcement, "Announcement"),
        HomeAction::Notice => (Banner::Notice, "Notice"),
        HomeAction::Changelog => {
            let resp = home::banner(&ctx.client, Banner::Changelog)?;
            return ctx.emit(resp, |changes: ChangelogResponse| {
                let rows: Vec<Vec<String>> = changes
                    .data
                    .iter()
                    .map(|c| {
                        vec![
                            date_cell(c.when()),
                            cell(c.kind.as_deref()),
                            cell(c.text()),
                            cell(c.version.as_deref()),
                        ]
                    })
                    .collect();
                build_table("Changelog", &["Date", "Type", "Description", "Version"], &rows)
            });
        }
    };
    let resp = home::banner(&ctx.client, banner)?;
    ctx.emit(resp, |notice: NoticeResponse| notice_lines(title, notice.data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_notice_says_so() {
        assert_eq!(notice_lines("Notice", None), vec!["Notice", "No results."]);
    }

    #[test]
    fn notice_panel_shortens_date() {
        let notice = Notice {
            title: Some("Hi".into()),
            date: Some("2024-04-01T00:00:00Z".into()),
            ..Default::default()
        };
        let lines = notice_lines("Banner", Some(notice));
        assert_eq!(lines[1], "  Title     Hi");
        assert_eq!(lines[4], "  Date      2024-04-01");
    }
}
