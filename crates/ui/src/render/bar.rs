/// Bar width is fixed regardless of how many items back it.
const BAR_WIDTH: usize = 40;

/// Fixed-width progress bar with a `done/total` suffix, or `None` when
/// there is nothing to measure.
#[must_use]
pub fn progress_bar(done: usize, total: usize) -> Option<String> {
    if total == 0 {
        return None;
    }

    let filled = (done * BAR_WIDTH / total).min(BAR_WIDTH);
    let mut bar = String::with_capacity(BAR_WIDTH * 3 + 16);
    for _ in 0..filled {
        bar.push('█');
    }
    for _ in filled..BAR_WIDTH {
        bar.push('░');
    }
    bar.push_str(&format!(" {done}/{total}"));
    Some(bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_has_no_bar() {
        assert_eq!(progress_bar(0, 0), None);
    }

    #[test]
    fn bar_fill_is_proportional() {
        let bar = progress_bar(3, 5).unwrap();
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), 24);
        assert_eq!(bar.chars().filter(|&c| c == '░').count(), 16);
        assert!(bar.ends_with(" 3/5"));
    }

    #[test]
    fn complete_bar_is_fully_filled() {
        let bar = progress_bar(4, 4).unwrap();
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), 40);
        assert!(bar.ends_with(" 4/4"));
    }

    #[test]
    fn untouched_bar_is_fully_empty() {
        let bar = progress_bar(0, 7).unwrap();
        assert_eq!(bar.chars().filter(|&c| c == '░').count(), 40);
    }
}
