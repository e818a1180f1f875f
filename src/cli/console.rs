use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::{
    daemon::{protocol::Notification, surface::Notifier},
    report::indicator::Tier,
};

pub fn tier_colour(tier: Tier) -> Colour {
    match tier {
        Tier::Good => Colour::Green,
        Tier::Warn => Colour::Yellow,
        Tier::Bad => Colour::Red,
        Tier::Empty => Colour::Fixed(250),
    }
}

pub fn heading(text: &str) -> String {
    Style::new().bold().paint(text).to_string()
}

/// Shows notifications in the terminal instead of the browser.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        println!("{}", heading(&notification.title));
        println!("{}", notification.message);
        if let Some(context) = &notification.context_message {
            println!("{}", Style::new().dimmed().paint(context.as_str()));
        }
        Ok(())
    }
}
