#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Browse,
    Search,
    FileInfo,
    Help,
}
