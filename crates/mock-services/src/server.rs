//! Mock 服务器
//!
//! `MockServer` 在 127.0.0.1 的随机端口上后台运行，供集成测试使用；
//! `serve` 是命令行入口使用的前台运行方式。

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::action_logic_routes;
use crate::store::MockState;

/// 健康检查响应
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// 健康检查端点
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// 构建完整应用
pub fn app(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(action_logic_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// 后台运行的测试服务器，drop 时停止
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(Arc::new(MockState::new())).await
    }

    pub async fn start_with(state: Arc<MockState>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("绑定端口失败")?;
        let addr = listener.local_addr().context("读取监听地址失败")?;

        let router = app(state.clone());
        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router).await {
                tracing::error!(error = %err, "Mock 服务异常退出");
            }
        });

        info!(%addr, "Mock 服务已启动");
        Ok(Self { addr, state, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// 例如 `http://127.0.0.1:54321`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &Arc<MockState> {
        &self.state
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// 在指定端口前台运行，直到收到 Ctrl+C
pub async fn serve(port: u16, state: Arc<MockState>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.context("绑定端口失败")?;

    info!("Mock 服务已启动: http://{}", addr);
    info!("可用端点:");
    info!("  GET /health - 健康检查");
    info!("  POST /action-logic - 规则执行（bool / input）");
    info!("  GET/DELETE /_mock/requests - 请求日志");
    info!("  POST /_mock/script - 追加预设响应");
    info!("按 Ctrl+C 停止服务");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务器运行失败")?;

    info!("Mock 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "安装 CTRL+C 信号处理器失败");
        std::future::pending::<()>().await;
    }
    info!("收到关闭信号，正在停止服务...");
}
