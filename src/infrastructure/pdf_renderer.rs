//! 无头浏览器 PDF 转换 - 基础设施层
//!
//! 唯一持有 Browser 的模块；每个文档使用独立的标签页，转换完即关闭。

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::ExportError;
use crate::infrastructure::document_renderer::{wrap_html, BoxError, DocumentRenderer};

/// 基于 Chromium 的 PDF 转换器
pub struct ChromePdfRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl ChromePdfRenderer {
    /// 启动无头浏览器
    ///
    /// # 参数
    /// - `chrome_executable`: 浏览器路径，为空时由 chromiumoxide 自动查找
    pub async fn launch(chrome_executable: Option<&Path>) -> Result<Self, ExportError> {
        info!("🚀 启动无头浏览器...");

        let mut builder = BrowserConfig::builder().new_headless_mode().args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ]);
        if let Some(path) = chrome_executable {
            debug!("浏览器路径: {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            ExportError::BrowserUnavailable(e)
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            ExportError::BrowserUnavailable(e.to_string())
        })?;

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 等待浏览器状态同步
        sleep(tokio::time::Duration::from_millis(300)).await;
        info!("✅ 无头浏览器已就绪");

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// 关闭浏览器
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器进程退出失败: {}", e);
        }
        self.handler_task.abort();
    }
}

/// 持有一个标签页，离开作用域时关闭它
///
/// 正常路径调用 `close()`；导出超时导致 future 被丢弃时，在后台关闭。
struct PageGuard(Option<Page>);

impl PageGuard {
    async fn close(mut self) {
        if let Some(page) = self.0.take() {
            if let Err(e) = page.close().await {
                debug!("关闭标签页失败: {}", e);
            }
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(page) = self.0.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        debug!("后台关闭标签页失败: {}", e);
                    }
                });
            }
        }
    }
}

#[async_trait]
impl DocumentRenderer for ChromePdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    async fn render(&self, html: &str) -> Result<Vec<u8>, BoxError> {
        let page = self.browser.new_page("about:blank").await?;
        let guard = PageGuard(Some(page.clone()));

        let pdf = async {
            page.set_content(wrap_html(html)).await?;
            page.pdf(PrintToPdfParams {
                print_background: Some(true),
                ..Default::default()
            })
            .await
        }
        .await;

        // 无论转换是否成功都关闭标签页
        guard.close().await;

        Ok(pdf?)
    }
}
