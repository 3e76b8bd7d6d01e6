use serde::Serialize;

#[derive(Serialize)]
pub struct RegistryAddPlan {
    pub action: &'static str,
    pub library: String,
    pub urls: Vec<String>,
}

#[derive(Serialize)]
pub struct RegistryAddResult {
    pub inserted: bool,
    pub library: String,
    pub urls: usize,
}

#[derive(Serialize)]
pub struct LibraryEntry {
    pub library: String,
    pub urls: Vec<String>,
}

#[derive(Serialize)]
pub struct LibraryList {
    pub libraries: Vec<LibraryEntry>,
}
