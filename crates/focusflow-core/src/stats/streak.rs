use chrono::{Duration, NaiveDate};

/// Consecutive days, ending today or yesterday, with at least one session.
///
/// `dates` may be unsorted and may repeat. A streak whose latest day is older
/// than yesterday has already been broken and counts as zero.
pub fn current_streak(dates: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let Some(&latest) = days.first() else {
        return 0;
    };
    if today - latest > Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    for pair in days.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Longest run of consecutive days anywhere in `dates`.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let mut days = dates.to_vec();
    days.sort_unstable();
    days.dedup();

    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(p) if day - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}
