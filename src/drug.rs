use std::fmt;

/// One of the five attribute dimensions every round is built from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Moa,
    Indications,
    Adverse,
    Interactions,
    Contraindications,
}

impl Category {
    /// All categories in round order.
    pub const ALL: [Category; 5] = [
        Category::Moa,
        Category::Indications,
        Category::Adverse,
        Category::Interactions,
        Category::Contraindications,
    ];

    /// Short key used in JSON input and as a CSS hook in the frontend.
    pub fn key(self) -> &'static str {
        match self {
            Category::Moa => "moa",
            Category::Indications => "indications",
            Category::Adverse => "adverse",
            Category::Interactions => "interactions",
            Category::Contraindications => "contraindications",
        }
    }

    /// Label shown to the player.
    pub fn display_name(self) -> &'static str {
        match self {
            Category::Moa => "Mechanism of Action",
            Category::Indications => "Indications",
            Category::Adverse => "Adverse Events",
            Category::Interactions => "Interactions",
            Category::Contraindications => "Contraindications",
        }
    }

    /// Column header used by spreadsheet exports of drug monographs.
    pub fn source_column(self) -> &'static str {
        match self {
            Category::Moa => "Mechanism of Action",
            Category::Indications => "Clinical Indications",
            Category::Adverse => "Adverse Events",
            Category::Interactions => "Drug Interactions",
            Category::Contraindications => "Contraindications",
        }
    }

    /// Input column names accepted for this category, in priority order.
    pub fn aliases(self) -> Vec<&'static str> {
        let mut aliases = vec![self.source_column(), self.key()];
        if !aliases.contains(&self.display_name()) {
            aliases.push(self.display_name());
        }
        aliases
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A normalized drug record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Drug {
    /// Position of the record in the raw input, before empty records were dropped.
    pub id: usize,
    pub name: String,
    /// Mechanism of action.
    #[serde(default)]
    pub moa: String,
    #[serde(default)]
    pub indications: String,
    /// Adverse events.
    #[serde(default)]
    pub adverse: String,
    #[serde(default)]
    pub interactions: String,
    #[serde(default)]
    pub contraindications: String,
}

impl Drug {
    pub fn attribute(&self, category: Category) -> &str {
        match category {
            Category::Moa => &self.moa,
            Category::Indications => &self.indications,
            Category::Adverse => &self.adverse,
            Category::Interactions => &self.interactions,
            Category::Contraindications => &self.contraindications,
        }
    }

    pub fn attribute_mut(&mut self, category: Category) -> &mut String {
        match category {
            Category::Moa => &mut self.moa,
            Category::Indications => &mut self.indications,
            Category::Adverse => &mut self.adverse,
            Category::Interactions => &mut self.interactions,
            Category::Contraindications => &mut self.contraindications,
        }
    }

    /// Returns the attribute text when it is present, ignoring surrounding whitespace.
    pub fn populated(&self, category: Category) -> Option<&str> {
        let text = self.attribute(category);
        (!text.trim().is_empty()).then_some(text)
    }

    pub fn populated_categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|category| self.populated(*category).is_some())
    }

    pub fn has_any_attribute(&self) -> bool {
        self.populated_categories().next().is_some()
    }
}

impl fmt::Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.name)
    }
}
