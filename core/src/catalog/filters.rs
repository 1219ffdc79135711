/// Query parameters for `/character`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterFilter {
    pub name: Option<String>,
    pub status: Option<String>,
    pub species: Option<String>,
    pub subtype: Option<String>,
    pub gender: Option<String>,
    pub page: Option<u32>,
}

/// Query parameters for `/episode`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeFilter {
    pub name: Option<String>,
    /// Episode code or prefix, e.g. `S01`
    pub episode: Option<String>,
    pub page: Option<u32>,
}

/// Query parameters for `/location`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationFilter {
    pub name: Option<String>,
    pub location_type: Option<String>,
    pub dimension: Option<String>,
    pub page: Option<u32>,
}

impl CharacterFilter {
    pub fn page(page: u32) -> Self {
        Self { page: Some(page), ..Self::default() }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", &self.name);
        push_text(&mut pairs, "status", &self.status);
        push_text(&mut pairs, "species", &self.species);
        push_text(&mut pairs, "type", &self.subtype);
        push_text(&mut pairs, "gender", &self.gender);
        push_page(&mut pairs, self.page);
        pairs
    }
}

impl EpisodeFilter {
    pub fn page(page: u32) -> Self {
        Self { page: Some(page), ..Self::default() }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", &self.name);
        push_text(&mut pairs, "episode", &self.episode);
        push_page(&mut pairs, self.page);
        pairs
    }
}

impl LocationFilter {
    pub fn page(page: u32) -> Self {
        Self { page: Some(page), ..Self::default() }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_text(&mut pairs, "name", &self.name);
        push_text(&mut pairs, "type", &self.location_type);
        push_text(&mut pairs, "dimension", &self.dimension);
        push_page(&mut pairs, self.page);
        pairs
    }
}

// Absent and blank values are left out of the query entirely.
fn push_text(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

fn push_page(pairs: &mut Vec<(&'static str, String)>, page: Option<u32>) {
    if let Some(page) = page.filter(|p| *p > 0) {
        pairs.push(("page", page.to_string()));
    }
}
