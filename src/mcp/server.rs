use crate::config::Config;
use crate::index::{path, DirectoryIndex, ListOptions, SortOrder};
use crate::loader::ManifestLoader;
use crate::output::{EntryOutput, ListingResult, StatsResult};
use rmcp::{
    ErrorData as McpError, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars::{self, JsonSchema},
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryInput {
    /// Directory to list; defaults to the browsing cursor.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    /// "kind" (directories first) or "name"
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnterDirectoryInput {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JumpToInput {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileInfoInput {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GoBackOutput {
    pub moved: bool,
    pub path: String,
}

/// Index plus loader behind the server's cursor.
struct BrowseSession {
    loader: ManifestLoader,
    index: DirectoryIndex,
    sort: SortOrder,
    page_size: usize,
}

impl BrowseSession {
    fn new(loader: ManifestLoader, config: &Config) -> Self {
        Self {
            loader,
            index: DirectoryIndex::new(),
            sort: config.browse.sort,
            page_size: config.browse.page_size,
        }
    }

    fn source(&self) -> String {
        self.loader.location().display().to_string()
    }

    async fn ensure_loaded(&mut self, dir: &str) -> Result<Vec<String>, McpError> {
        let report = self
            .loader
            .load_for(dir, &mut self.index)
            .await
            .map_err(|e| McpError::internal_error(format!("{:#}", e), None))?;
        Ok(report.failed.into_iter().map(|(id, _)| id).collect())
    }

    async fn list(&mut self, input: ListDirectoryInput) -> Result<ListingResult, McpError> {
        let dir = match &input.path {
            Some(p) => path::normalize(p),
            None => self.index.current_path().to_string(),
        };
        let failed = self.ensure_loaded(&dir).await?;

        let sort = match input.sort.as_deref() {
            Some(s) => s
                .parse::<SortOrder>()
                .map_err(|e| McpError::invalid_params(e, None))?,
            None => self.sort,
        };
        let mut options = ListOptions::default().sort_by(sort).page(
            input.page.unwrap_or(1),
            input.page_size.unwrap_or(self.page_size),
        );
        if let Some(text) = &input.search {
            options = options.search(text.clone());
        }

        let listing = self.index.list_directory(&dir, &options);
        let mut result = ListingResult::new(self.source(), path::display(&dir), input.search, &listing);
        result.failed_partitions = failed;
        Ok(result)
    }

    async fn cursor_listing(&mut self) -> Result<ListingResult, McpError> {
        let dir = self.index.current_path().to_string();
        let failed = self.ensure_loaded(&dir).await?;
        let listing = self.index.current_listing(self.sort, self.page_size);
        let search = self.index.navigation().search_text().to_string();
        let mut result = ListingResult::new(
            self.source(),
            path::display(&dir),
            (!search.is_empty()).then_some(search),
            &listing,
        );
        result.failed_partitions = failed;
        Ok(result)
    }

    async fn enter(&mut self, name: &str) -> Result<ListingResult, McpError> {
        let here = self.index.current_path().to_string();
        self.ensure_loaded(&here).await?;
        self.index
            .enter(name)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        self.cursor_listing().await
    }

    async fn file_info(&mut self, full_path: &str) -> Result<EntryOutput, McpError> {
        let target = path::normalize(full_path);
        let (parent, _) = path::split_parent(&target)
            .ok_or_else(|| McpError::invalid_params("the root has no entry of its own", None))?;
        self.ensure_loaded(&parent).await?;
        self.index
            .get(&target)
            .map(EntryOutput::from)
            .ok_or_else(|| McpError::invalid_params(format!("No entry at {}", path::display(&target)), None))
    }

    async fn stats(&mut self) -> Result<StatsResult, McpError> {
        self.loader
            .load_all(&mut self.index)
            .await
            .map_err(|e| McpError::internal_error(format!("{:#}", e), None))?;
        Ok(StatsResult::new(
            self.source(),
            self.loader.index_document().is_some(),
            self.index.stats(),
            self.index.warnings().iter().map(|w| w.to_string()).collect(),
        ))
    }
}

#[derive(Clone)]
pub struct DirLensServer {
    session: Arc<Mutex<BrowseSession>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DirLensServer {
    pub fn new(loader: ManifestLoader, config: &Config) -> Self {
        Self {
            session: Arc::new(Mutex::new(BrowseSession::new(loader, config))),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List a directory of the manifest (defaults to the browsing cursor)")]
    pub async fn list_directory(
        &self,
        input: Parameters<ListDirectoryInput>,
    ) -> Result<CallToolResult, McpError> {
        let output = self.session.lock().await.list(input.0).await?;
        Ok(CallToolResult::success(vec![Content::json(output)?]))
    }

    #[tool(description = "Move the cursor into a child directory of the current directory")]
    pub async fn enter_directory(
        &self,
        input: Parameters<EnterDirectoryInput>,
    ) -> Result<CallToolResult, McpError> {
        let output = self.session.lock().await.enter(&input.0.name).await?;
        Ok(CallToolResult::success(vec![Content::json(output)?]))
    }

    #[tool(description = "Return the cursor to the previous directory")]
    pub async fn go_back(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        let moved = session.index.back();
        let output = GoBackOutput {
            moved,
            path: path::display(session.index.current_path()),
        };
        let listing = session.cursor_listing().await?;
        Ok(CallToolResult::success(vec![
            Content::json(output)?,
            Content::json(listing)?,
        ]))
    }

    #[tool(description = "Return the cursor to the root directory")]
    pub async fn go_home(&self) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        session.index.home();
        let output = session.cursor_listing().await?;
        Ok(CallToolResult::success(vec![Content::json(output)?]))
    }

    #[tool(description = "Move the cursor to any directory path")]
    pub async fn jump_to(&self, input: Parameters<JumpToInput>) -> Result<CallToolResult, McpError> {
        let mut session = self.session.lock().await;
        session.index.jump_to(&input.0.path);
        let output = session.cursor_listing().await?;
        Ok(CallToolResult::success(vec![Content::json(output)?]))
    }

    #[tool(description = "Get details for one file or folder by full path")]
    pub async fn file_info(
        &self,
        input: Parameters<FileInfoInput>,
    ) -> Result<CallToolResult, McpError> {
        let output = self.session.lock().await.file_info(&input.0.path).await?;
        Ok(CallToolResult::success(vec![Content::json(output)?]))
    }

    #[tool(description = "Load the whole manifest and report totals")]
    pub async fn index_stats(&self) -> Result<CallToolResult, McpError> {
        let output = self.session.lock().await.stats().await?;
        Ok(CallToolResult::success(vec![Content::json(output)?]))
    }
}

#[tool_handler]
impl ServerHandler for DirLensServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_mcp_server(loader: ManifestLoader, config: Config) -> anyhow::Result<()> {
    use rmcp::transport::stdio;

    let server = DirLensServer::new(loader, &config);
    let service = server.serve(stdio()).await?;

    service.waiting().await?;

    Ok(())
}
