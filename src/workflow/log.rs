/// Human-readable progress lines for one run.
///
/// Every line is kept, mirrored to `tracing`, and handed to an optional sink
/// (the CLI prints them as they arrive).
#[derive(Default)]
pub struct ProcessingLog {
    lines: Vec<String>,
    sink: Option<Box<dyn FnMut(&str) + Send>>,
}

impl ProcessingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(sink: impl FnMut(&str) + Send + 'static) -> Self {
        Self {
            lines: Vec::new(),
            sink: Some(Box::new(sink)),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "ailocator::log", "{}", line.trim_start());
        if let Some(sink) = self.sink.as_mut() {
            sink(&line);
        }
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl std::fmt::Debug for ProcessingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingLog")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}
