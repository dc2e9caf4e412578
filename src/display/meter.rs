use std::{
    io::{self, Write},
    iter::{once, repeat, repeat_n},
};

/// a horizontal bar showing a single percentage.
pub struct Meter<'a> {
    pub name: &'a str,
    pub percent: f64,
    pub width: usize,
}

/// a one-line chart of a series of percentages.
pub struct Sparkline<'a> {
    pub series: &'a [f64],
    pub width: usize,
}

/// === impl Meter ===

impl Meter<'_> {
    // XXX: a simple, hacky meter.
    pub fn draw(&self, writer: &mut impl Write) -> io::Result<()> {
        const ACTIVE: char = '█';
        const IDLE: char = ' ';
        const BORDER_L: char = '[';
        const BORDER_R: char = ']';

        let Self {
            name,
            percent,
            width,
        } = *self;

        // print the label.
        write!(writer, "{name}: ")?;

        // print the meter.
        let meter = {
            let active = repeat_n(ACTIVE, Self::filled(percent, width));
            let idle = repeat(IDLE);
            active.chain(idle).take(width)
        };
        let meter = once(BORDER_L).chain(meter).chain(once(BORDER_R));
        let bytes = meter.collect::<String>().into_bytes();
        writer.write_all(&bytes)?;

        // print the value.
        write!(writer, " {percent:>5.1}%")
    }

    /// the number of cells filled by `percent`.
    fn filled(percent: f64, width: usize) -> usize {
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        (fraction * width as f64).round() as usize
    }
}

/// === impl Sparkline ===

impl Sparkline<'_> {
    const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

    /// draws the newest `width` values of the series, oldest first.
    pub fn draw(&self, writer: &mut impl Write) -> io::Result<()> {
        let Self { series, width } = *self;

        let skip = series.len().saturating_sub(width);
        let line = series[skip..]
            .iter()
            .map(|percent| Self::level(*percent))
            .collect::<String>();
        writer.write_all(line.as_bytes())
    }

    fn level(percent: f64) -> char {
        let top = Self::LEVELS.len() - 1;
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        Self::LEVELS[(fraction * top as f64).round() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn(draw: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        draw(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_meter() {
        let meter = Meter {
            name: "cpu0",
            percent: 0.0,
            width: 4,
        };
        assert_eq!(drawn(|w| meter.draw(w)), "cpu0: [    ]   0.0%");
    }

    #[test]
    fn half_meter() {
        let meter = Meter {
            name: "cpu1",
            percent: 50.0,
            width: 4,
        };
        assert_eq!(drawn(|w| meter.draw(w)), "cpu1: [██  ]  50.0%");
    }

    #[test]
    fn full_meter() {
        let meter = Meter {
            name: "cpu2",
            percent: 100.0,
            width: 3,
        };
        assert_eq!(drawn(|w| meter.draw(w)), "cpu2: [███] 100.0%");
    }

    #[test]
    fn sparkline_levels() {
        let series = [0.0, 50.0, 100.0];
        let line = Sparkline {
            series: &series,
            width: 10,
        };
        assert_eq!(drawn(|w| line.draw(w)), "▁▅█");
    }

    #[test]
    fn sparkline_keeps_the_newest() {
        let series = [100.0, 100.0, 0.0, 0.0];
        let line = Sparkline {
            series: &series,
            width: 2,
        };
        assert_eq!(drawn(|w| line.draw(w)), "▁▁");
    }
}
