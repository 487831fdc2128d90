use anyhow::Result;
use clap::Args;
use tracing::{debug, info};

use super::{marker_bar, pad_cell};
use crate::api::{self, Character};
use crate::config::Config;
use crate::gallery::{
    episode_label, format_episode_ranges, status_label, FilterState, GalleryView, GenderFilter,
    PaginationController, StatusFilter,
};

/// Print one page of characters non-interactively
#[derive(Args)]
pub struct ListCommand {
    /// 1-based page to show; pages past the buffered ones are fetched on the way
    #[arg(short = 'p', long = "page", default_value_t = 1)]
    pub page: usize,

    /// Case-insensitive name search
    #[arg(short = 's', long = "search")]
    pub search: Option<String>,

    /// alive, dead, unknown or all
    #[arg(long = "status", default_value = "all")]
    pub status: StatusFilter,

    /// female, male, genderless, unknown or all
    #[arg(long = "gender", default_value = "all")]
    pub gender: GenderFilter,

    /// Print the view as JSON
    #[arg(long = "json")]
    pub json: bool,
}

impl ListCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing list command");
        let source = api::source_from_config(config)?;
        let mut controller = PaginationController::new(config.page_size, config.initial_pages);

        let plan = controller.start();
        controller.drive(source.as_ref(), plan).await?;

        let filter = FilterState::new()
            .with_search(self.search.clone().unwrap_or_default())
            .with_status(self.status)
            .with_gender(self.gender);
        let plan = controller.set_filter(filter);
        controller.drive(source.as_ref(), plan).await?;

        // Landing on the last known page grows the buffer, so keep going until
        // the requested page exists or upstream runs out.
        loop {
            let plan = controller.select_page(self.page);
            controller.drive(source.as_ref(), plan).await?;
            if controller.current_page() >= self.page || controller.buffer().is_exhausted() {
                break;
            }
        }

        let view = controller.snapshot();
        info!(
            "showing page {} of {} ({} matching, {} buffered)",
            view.current_page, view.total_pages, view.filtered_count, view.buffered_count
        );

        if self.json {
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            print!("{}", render_table(&view));
        }

        Ok(())
    }
}

/// Plain-text rendering of a view
pub fn render_table(view: &GalleryView<Character>) -> String {
    let mut out = String::new();

    if view.visible_items.is_empty() {
        out.push_str("No characters match the current filters.\n");
    }

    for character in &view.visible_items {
        out.push_str(&format!(
            "{:>4}  {}  {}  {}  {}\n",
            character.id,
            pad_cell(&character.name, 28),
            pad_cell(status_label(&character.status), 13),
            pad_cell(&character.gender, 10),
            pad_cell(&character.species, 12),
        ));
        out.push_str(&format!(
            "      location: {}  origin: {}\n",
            character.location.name, character.origin.name
        ));
        out.push_str(&format!(
            "      {}: {}\n",
            episode_label(character.episode.len()),
            format_episode_ranges(&character.episode)
        ));
    }

    out.push('\n');
    out.push_str(&marker_bar(&view.visible_page_markers, view.current_page, view.total_pages));
    out.push('\n');
    out.push_str(&format!(
        "Page {} of {} · {} matching · {} buffered{}\n",
        view.current_page,
        view.total_pages,
        view.filtered_count,
        view.buffered_count,
        if view.exhausted { "" } else { " · more upstream" }
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemoryPageSource;

    #[tokio::test]
    async fn test_render_table_for_first_page() {
        let source = MemoryPageSource::new(api::demo_characters(), 20);
        let mut controller: PaginationController<Character> = PaginationController::new(15, 3);
        let plan = controller.start();
        controller.drive(&source, plan).await.unwrap();

        let table = render_table(&controller.snapshot());
        assert!(table.contains("Page 1 of 4"));
        assert!(table.contains("more upstream"));
        assert!(table.contains("[1]"));
        assert_eq!(table.lines().filter(|line| line.contains("Episode")).count(), 15);
    }

    #[test]
    fn test_render_empty_view() {
        let controller: PaginationController<Character> = PaginationController::new(15, 3);
        let table = render_table(&controller.snapshot());
        assert!(table.starts_with("No characters match"));
        assert!(table.contains("Page 1 of 0"));
    }
}
