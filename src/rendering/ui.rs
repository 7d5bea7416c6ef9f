//! Text layout helpers for the menu and HUD surfaces.
//!
//! The engine never draws; these functions produce plain strings the
//! front end prints however it likes.

use crate::game::MessageLog;
use crate::{config, DelveError, DelveResult};

/// Lays out a lettered option menu.
///
/// Options are keyed `(a)` through `(z)`; a menu with more than 26
/// entries cannot be keyed and is rejected.
///
/// # Examples
///
/// ```
/// use delve::rendering::menu_lines;
///
/// let lines = menu_lines("Inventory", &["healing potion".into()]).unwrap();
/// assert_eq!(lines, vec!["Inventory".to_string(), "(a) healing potion".to_string()]);
/// ```
pub fn menu_lines(title: &str, options: &[String]) -> DelveResult<Vec<String>> {
    if options.len() > config::INVENTORY_CAPACITY {
        return Err(DelveError::InvalidAction(format!(
            "cannot have a menu with more than 26 options, got {}",
            options.len()
        )));
    }

    let mut lines = Vec::with_capacity(options.len() + 1);
    if !title.is_empty() {
        lines.push(title.to_string());
    }
    for (idx, option) in options.iter().enumerate() {
        let key = (b'a' + idx as u8) as char;
        lines.push(format!("({}) {}", key, option));
    }
    Ok(lines)
}

/// The menu index a letter key selects, if it addresses an option.
pub fn menu_index(key: char, option_count: usize) -> Option<usize> {
    if !key.is_ascii_lowercase() {
        return None;
    }
    let idx = (key as u8 - b'a') as usize;
    (idx < option_count).then_some(idx)
}

/// The most recent log messages formatted for a HUD panel of `height`
/// lines, oldest first.
pub fn log_lines(log: &MessageLog, height: usize) -> Vec<String> {
    log.tail(height).iter().map(|m| m.text.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::Color;

    #[test]
    fn test_menu_letters_options() {
        let options = vec!["sword".to_string(), "shield".to_string()];
        let lines = menu_lines("Pick one", &options).unwrap();
        assert_eq!(lines[0], "Pick one");
        assert_eq!(lines[1], "(a) sword");
        assert_eq!(lines[2], "(b) shield");
    }

    #[test]
    fn test_menu_skips_empty_title() {
        let lines = menu_lines("", &["thing".to_string()]).unwrap();
        assert_eq!(lines, vec!["(a) thing".to_string()]);
    }

    #[test]
    fn test_menu_rejects_more_than_26_options() {
        let options: Vec<String> = (0..27).map(|i| format!("item {}", i)).collect();
        assert!(menu_lines("too many", &options).is_err());
    }

    #[test]
    fn test_menu_index_bounds() {
        assert_eq!(menu_index('a', 3), Some(0));
        assert_eq!(menu_index('c', 3), Some(2));
        assert_eq!(menu_index('d', 3), None);
        assert_eq!(menu_index('A', 3), None);
        assert_eq!(menu_index('!', 3), None);
    }

    #[test]
    fn test_log_lines_takes_the_tail() {
        let mut log = MessageLog::new();
        for i in 0..10 {
            log.add(format!("m{}", i), Color::WHITE);
        }
        assert_eq!(log_lines(&log, 3), vec!["m7", "m8", "m9"]);
    }
}
