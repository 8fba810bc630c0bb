// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::controller::{Side, Surface};
use crate::error::ConvertError;
use crate::models::{ConversionResult, Flag};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Line-oriented surface for one-shot commands.
pub struct ConsoleSurface {
    spinner: Option<ProgressBar>,
    show_flags: bool,
}

impl ConsoleSurface {
    pub fn new(show_flags: bool) -> Self {
        Self {
            spinner: None,
            show_flags,
        }
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Surface for ConsoleSurface {
    fn render_loading(&mut self) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Getting exchange rate...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn render(&mut self, result: &ConversionResult) {
        self.stop_spinner();
        println!("{}", result.amount_line());
        println!("{}", result.rate_line());
    }

    fn render_error(&mut self, _error: &ConvertError) {
        self.stop_spinner();
        eprintln!("⚠️  {}", ConvertError::USER_MESSAGE);
    }

    fn update_flag(&mut self, side: Side, flag: &Flag) {
        if self.show_flags {
            let label = match side {
                Side::From => "From",
                Side::To => "To",
            };
            println!("{:<5} {} {} ({})", label, flag.emoji, flag.alt, flag.url);
        }
    }
}

impl Drop for ConsoleSurface {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
