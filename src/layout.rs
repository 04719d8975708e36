// ABOUTME: Text layout for the impact-slides canvas exporter
// ABOUTME: Greedy word wrapping per paragraph and the overflow policy

/// Anything that can tell how wide a run of text would be when drawn.
pub trait TextMeasure {
    fn text_width(&mut self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: FnMut(&str) -> f32,
{
    fn text_width(&mut self, text: &str) -> f32 {
        self(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    /// Baseline of the line.
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedBlock {
    pub lines: Vec<WrappedLine>,
    /// First free y below the block.
    pub next_y: f32,
}

/// What to do with text that runs into the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Draw every line, even past the safe area.
    Allow,
    /// Drop lines below the safe area and mark the cut with an ellipsis.
    #[default]
    Truncate,
}

/// Wrap `text` into lines no wider than `max_width`, starting at baseline `y`.
///
/// Explicit newlines always start a new paragraph and every paragraph yields
/// at least one line. A single word wider than `max_width` stays on its own
/// line rather than being split.
pub fn wrap_text<M>(
    measure: &mut M,
    text: &str,
    y: f32,
    max_width: f32,
    line_height: f32,
) -> WrappedBlock
where
    M: TextMeasure + ?Sized,
{
    let mut lines = Vec::new();
    let mut current_y = y;

    for paragraph in text.split('\n') {
        let mut line = String::new();

        for (n, word) in paragraph.split(' ').enumerate() {
            let test_line = format!("{}{} ", line, word);
            if n > 0 && measure.text_width(&test_line) > max_width {
                lines.push(WrappedLine {
                    text: line.trim_end().to_string(),
                    y: current_y,
                });
                line = format!("{} ", word);
                current_y += line_height;
            } else {
                line = test_line;
            }
        }

        lines.push(WrappedLine {
            text: line.trim_end().to_string(),
            y: current_y,
        });
        current_y += line_height;
    }

    WrappedBlock {
        lines,
        next_y: current_y,
    }
}

impl WrappedBlock {
    /// Keep only lines whose baseline is at or above `limit_y`.
    ///
    /// Returns true when something was cut. `next_y` is left untouched so the
    /// caller still knows how far the text would have gone.
    pub fn truncate(&mut self, limit_y: f32) -> bool {
        let keep = self.lines.iter().take_while(|l| l.y <= limit_y).count();
        if keep == self.lines.len() {
            return false;
        }

        self.lines.truncate(keep);
        if let Some(last) = self.lines.last_mut() {
            last.text.push('…');
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.text.is_empty())
    }
}

/// Lines placed on one slide so far, each tagged with how to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn<S> {
    lines: Vec<(WrappedLine, S)>,
    cut: bool,
}

impl<S> Default for TextColumn<S> {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            cut: false,
        }
    }
}

impl<S: Clone> TextColumn<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block drawn with `style`.
    ///
    /// With a `limit_y`, lines below it are dropped and the last line left in
    /// the column gets the `…`, even when it belongs to an earlier block.
    /// Returns true when this block was cut. After a cut every later block is
    /// ignored.
    pub fn push(&mut self, mut block: WrappedBlock, style: S, limit_y: Option<f32>) -> bool {
        if self.cut {
            return false;
        }

        if let Some(limit_y) = limit_y {
            if block.truncate(limit_y) {
                self.cut = true;
                if block.lines.is_empty() {
                    if let Some((last, _)) = self.lines.last_mut() {
                        last.text.push('…');
                    }
                }
            }
        }

        self.lines
            .extend(block.lines.into_iter().map(|line| (line, style.clone())));
        self.cut
    }

    pub fn is_cut(&self) -> bool {
        self.cut
    }

    pub fn lines(&self) -> &[(WrappedLine, S)] {
        &self.lines
    }
}
