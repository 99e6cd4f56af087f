use std::collections::BTreeSet;

use itertools::Itertools;

/// This method should display the time in a sensible format. If it is less than a second, it should
/// only display the milliseconds and microseconds. If it is less than a minute, it should display
/// the seconds and milliseconds. If it is less than an hour, it should display the minutes and
/// seconds. If it is less than a day, it should display the hours and minutes. If it is more than a
/// day, it should display the days and hours.
pub fn show_duration(duration: std::time::Duration) -> String {
    let ms = duration.as_millis();
    let us = duration.as_micros();
    let s = duration.as_secs();
    let m = s / 60;
    let h = m / 60;
    let d = h / 24;

    if d > 0 {
        format!("{}d {}h", d, h % 24)
    } else if h > 0 {
        format!("{}h {}m", h, m % 60)
    } else if m > 0 {
        format!("{}m {}s", m, s % 60)
    } else if s > 0 {
        format!("{}s {}ms", s, ms % 1000)
    } else if ms > 0 {
        format!("{}ms {}us", ms, us % 1000)
    } else {
        format!("{}us", us)
    }
}

/// Helper trait which can be used to display states, symbols, traces and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state that should be
    /// for example q0, q1, q2, ... and for a symbol just the symbol itself.
    /// This is used for printing, for rendering and for the natural ordering of identifiers.
    fn show(&self) -> String;
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for &str {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for char {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for u32 {
    fn show(&self) -> String {
        self.to_string()
    }
}

/// A sequence is shown as a tuple, `(a, b, c)`.
impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        format!("({})", self.iter().map(Show::show).join(", "))
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        self.as_slice().show()
    }
}

impl<S: Show> Show for BTreeSet<S> {
    fn show(&self) -> String {
        format!("{{{}}}", self.iter().map(Show::show).join(", "))
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{show_duration, Show};

    #[test]
    fn show_nested_collections() {
        let future: BTreeSet<Vec<String>> = [
            vec!["a".to_string()],
            vec!["a".to_string(), "b".to_string()],
        ]
        .into_iter()
        .collect();
        assert_eq!(future.show(), "{(a), (a, b)}");
        assert_eq!(BTreeSet::<Vec<String>>::new().show(), "{}");
        assert_eq!(("q0", 3usize).show(), "(q0, 3)");
    }

    #[test]
    fn durations() {
        assert_eq!(
            show_duration(std::time::Duration::from_micros(1500)),
            "1ms 500us"
        );
        assert_eq!(show_duration(std::time::Duration::from_secs(61)), "1m 1s");
    }
}
