use {
    super::{
        DisplayAdapter, RenderError,
        meter::{Meter, Sparkline},
    },
    crate::series::Snapshot,
    crossterm::{
        ExecutableCommand, QueueableCommand, cursor,
        style::{self, Stylize},
        terminal,
    },
    std::io::{self, Stdout, Write},
};

/// draws the rolling window to the terminal.
///
/// each core gets one row: its label, a meter of its newest value, and a sparkline of the whole
/// window. every core that fits in the terminal is drawn, or at most `height` if it is set.
pub struct TerminalDisplay {
    stdout: Stdout,
    height: Option<usize>,
}

impl TerminalDisplay {
    /// the width of each core's meter, in cells.
    const METER: usize = 20;
    /// the column at which rows begin, inside the border.
    const LEFT: u16 = 2;
    /// the row of the first core, below the header.
    const TOP: u16 = 3;

    /// takes over the terminal, switching to the alternate screen.
    ///
    /// the terminal is restored when the display is dropped.
    pub fn new(height: Option<usize>) -> io::Result<Self> {
        let mut stdout = io::stdout();
        stdout
            .execute(terminal::EnterAlternateScreen)?
            .execute(cursor::Hide)?;
        Self::clear(&mut stdout)?;

        Ok(Self { stdout, height })
    }

    /// clears the screen.
    fn clear(stdout: &mut Stdout) -> Result<(), io::Error> {
        stdout
            .execute(terminal::Clear(terminal::ClearType::All))
            .map(drop)
    }

    // XXX(kate): this could be prettier.
    fn border(stdout: &mut Stdout, cols: u16, rows: u16) -> Result<(), io::Error> {
        for y in 0..rows {
            for x in 0..cols {
                if (y == 0 || y == rows - 1) || (x == 0 || x == cols - 1) {
                    // in this loop we are more efficient by not flushing the buffer.
                    stdout
                        .queue(cursor::MoveTo(x, y))?
                        .queue(style::PrintStyledContent("█".grey()))?;
                }
            }
        }

        Ok(())
    }

    /// how many of `cores` rows to draw, when `fits` rows fit on the screen.
    ///
    /// if some cores are hidden, a row below them says how many. that row must fit on the screen.
    fn visible(cores: usize, fits: usize, height: Option<usize>) -> usize {
        let limit = height.map_or(fits, |height| height.min(fits));
        if cores <= limit {
            cores
        } else if limit < fits {
            limit
        } else {
            fits.saturating_sub(1)
        }
    }

    fn header(stdout: &mut Stdout, snapshot: &Snapshot) -> Result<(), io::Error> {
        let span = match snapshot.span() {
            Some((first, last)) => format!("ticks {first}..={last}"),
            None => "waiting for the first sample".to_owned(),
        };
        let header = format!("tach · {} cores · {span}", snapshot.core_count());

        stdout
            .queue(cursor::MoveTo(Self::LEFT, 1))?
            .queue(style::PrintStyledContent(header.grey()))?;

        Ok(())
    }
}

impl DisplayAdapter for TerminalDisplay {
    fn render(&mut self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let Self { stdout, height } = self;
        let (cols, rows) = terminal::size()?;

        stdout.queue(terminal::Clear(terminal::ClearType::All))?;
        Self::border(stdout, cols, rows)?;
        Self::header(stdout, snapshot)?;

        // leave room for the border, the header, and the "+N more" line.
        let fits = usize::from(rows.saturating_sub(Self::TOP + 1));
        let visible = Self::visible(snapshot.core_count(), fits, *height);
        let spark = usize::from(cols).saturating_sub(usize::from(Self::LEFT) * 2 + Self::METER + 20);

        for (i, series) in snapshot.cores.iter().enumerate().take(visible) {
            let name = format!("cpu{i}");
            let percent = series.last().copied().unwrap_or_default();
            let row = Self::TOP + i as u16;

            stdout.queue(cursor::MoveTo(Self::LEFT, row))?;
            Meter {
                name: &name,
                percent,
                width: Self::METER,
            }
            .draw(stdout)?;
            stdout.write_all(b" ")?;
            Sparkline {
                series,
                width: spark,
            }
            .draw(stdout)?;
        }

        if snapshot.core_count() > visible {
            let hidden = format!("+{} more", snapshot.core_count() - visible);
            stdout
                .queue(cursor::MoveTo(Self::LEFT, Self::TOP + visible as u16))?
                .queue(style::PrintStyledContent(hidden.grey()))?;
        }

        stdout.flush()?;
        Ok(())
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        let Self { stdout, .. } = self;

        // nothing more can be done if the terminal cannot be restored.
        let _ = stdout
            .execute(cursor::Show)
            .and_then(|stdout| stdout.execute(terminal::LeaveAlternateScreen));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_core_that_fits_is_drawn() {
        assert_eq!(TerminalDisplay::visible(16, 40, None), 16);
    }

    #[test]
    fn overflow_leaves_room_for_the_summary() {
        assert_eq!(TerminalDisplay::visible(16, 10, None), 9);
    }

    #[test]
    fn height_caps_the_rows() {
        assert_eq!(TerminalDisplay::visible(16, 40, Some(6)), 6);
        assert_eq!(TerminalDisplay::visible(4, 40, Some(6)), 4);
    }

    #[test]
    fn height_never_exceeds_the_screen() {
        assert_eq!(TerminalDisplay::visible(16, 5, Some(6)), 4);
    }
}
