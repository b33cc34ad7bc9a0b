use std::fmt::Display;

/// Plain-text page builder used by the screen renderers.
#[derive(Debug, Default)]
pub struct Page {
    out: String,
}

impl Page {
    pub fn new(title: &str) -> Self {
        let mut page = Self::default();
        page.out.push_str("# ");
        page.out.push_str(title);
        page.out.push('\n');
        page
    }

    pub fn header(&mut self, text: impl Display) {
        self.out.push_str(&format!("\n## {}\n", text));
    }

    pub fn subheader(&mut self, text: impl Display) {
        self.out.push_str(&format!("### {}\n", text));
    }

    pub fn line(&mut self, text: impl Display) {
        self.out.push_str(&format!("{}\n", text));
    }

    /// Subheader followed by its value.
    pub fn field(&mut self, label: &str, value: impl Display) {
        self.subheader(label);
        self.line(value);
    }

    pub fn image(&mut self, url: &str) {
        self.out.push_str(&format!("[image] {}\n", url));
    }

    /// Shown in place of a section whose data could not be loaded.
    pub fn error(&mut self, section: &str, err: impl Display) {
        self.out
            .push_str(&format!("[error] Unable to load {}: {}\n", section, err));
    }

    pub fn finish(self) -> String {
        self.out
    }
}
