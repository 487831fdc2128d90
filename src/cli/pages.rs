use anyhow::{anyhow, Result};
use clap::Args;

use super::marker_bar;
use crate::gallery::compute_visible_pages;

/// Print the page-number bar for a given position
#[derive(Args)]
pub struct PagesCommand {
    /// Current 1-based page
    #[arg(short = 'c', long = "current")]
    pub current: usize,

    /// Total number of pages
    #[arg(short = 't', long = "total")]
    pub total: usize,

    /// Print the markers as a JSON array
    #[arg(long = "json")]
    pub json: bool,
}

impl PagesCommand {
    pub fn execute(&self) -> Result<()> {
        if self.current == 0 {
            return Err(anyhow!("pages are 1-based; --current must be at least 1"));
        }

        let markers = compute_visible_pages(self.current, self.total);
        if self.json {
            println!("{}", serde_json::to_string(&markers)?);
        } else {
            println!("{}", marker_bar(&markers, self.current.min(self.total.max(1)), self.total));
        }
        Ok(())
    }
}
