//! ローカル確認用のビューアサーバー
//!
//! 1接続ずつ順番に処理する。`GET /` のたびにスナップショットを読み直して
//! ページを描画し、`GET /thumbs/...` はスナップショットのディレクトリから返す。

use super::page::{render_page, PageOptions};
use crate::error::{FlagColorsError, Result};
use crate::extractor::THUMBS_DIR_NAME;
use crate::snapshot::load_snapshot;
use flag_colors_common::Palette;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

const MAX_REQUEST_HEAD_BYTES: u64 = 16 * 1024;

/// リクエストヘッダーを待つ上限。何も送らない接続（ブラウザの先行接続など）で詰まらないように
pub const DEFAULT_HEAD_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    fn text(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: message.as_bytes().to_vec(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    fn head(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        )
    }
}

/// リクエストパスを相対パスに正規化する。
/// `..`・絶対パス・隠しファイルは拒否
pub fn sanitize_request_path(raw: &str) -> Option<String> {
    let trimmed = raw.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let mut components = Vec::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str()?;
                if part.starts_with('.') {
                    return None;
                }
                components.push(part);
            }
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if components.is_empty() {
        return None;
    }
    Some(components.join("/"))
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

/// リクエスト行を返し、続くヘッダーは読み捨てる
async fn read_request_head<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }
    Ok(request_line)
}

pub struct ViewerServer {
    snapshot_path: PathBuf,
    /// サムネイルの基準ディレクトリ（スナップショットの親）
    root: PathBuf,
    palette: Palette,
    options: PageOptions,
    head_timeout: Duration,
}

impl ViewerServer {
    /// 起動時にスナップショットを一度読み込み、無ければ失敗させる
    pub fn new(snapshot_path: &Path, palette: Palette, options: PageOptions) -> Result<Self> {
        load_snapshot(snapshot_path)?;

        let root = snapshot_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            snapshot_path: snapshot_path.to_path_buf(),
            root,
            palette,
            options: PageOptions {
                thumb_base: String::new(),
                ..options
            },
            head_timeout: DEFAULT_HEAD_TIMEOUT,
        })
    }

    pub fn with_head_timeout(mut self, timeout: Duration) -> Self {
        self.head_timeout = timeout;
        self
    }

    pub async fn bind(&self, addr: &str) -> Result<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|e| FlagColorsError::Server(format!("{}: {}", addr, e)))
    }

    /// 受け付けたリクエストを順に処理し続ける
    pub async fn serve(&self, listener: TcpListener, verbose: bool) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            if let Err(e) = self.handle(stream, verbose).await {
                eprintln!("⚠ {}: {}", peer, e);
            }
        }
    }

    async fn handle(&self, mut stream: TcpStream, verbose: bool) -> Result<()> {
        let (reader, mut writer) = stream.split();
        let mut reader = BufReader::new(reader.take(MAX_REQUEST_HEAD_BYTES));

        let request_line = tokio::time::timeout(self.head_timeout, read_request_head(&mut reader))
            .await
            .map_err(|_| {
                FlagColorsError::Server(format!(
                    "リクエスト待ちがタイムアウトしました（{}秒）",
                    self.head_timeout.as_secs_f32()
                ))
            })??;

        let mut parts = request_line.split_whitespace();
        let response = match (parts.next(), parts.next()) {
            (Some(method), Some(target)) => self.respond(method, target),
            _ => Response::text(400, "bad request"),
        };

        if verbose {
            println!("  {} -> {}", request_line.trim_end(), response.status);
        }

        writer.write_all(response.head().as_bytes()).await?;
        writer.write_all(&response.body).await?;
        writer.shutdown().await?;
        Ok(())
    }

    pub fn respond(&self, method: &str, target: &str) -> Response {
        if method != "GET" {
            return Response::text(405, "method not allowed");
        }

        let path = target.split(['?', '#']).next().unwrap_or("/");
        if path == "/" || path == "/index.html" {
            return self.render();
        }

        let Some(relative) = sanitize_request_path(path) else {
            return Response::text(404, "not found");
        };
        if !relative.starts_with(&format!("{}/", THUMBS_DIR_NAME)) {
            return Response::text(404, "not found");
        }

        let file = self.root.join(&relative);
        match std::fs::read(&file) {
            Ok(body) => Response {
                status: 200,
                content_type: content_type_for(&file),
                body,
            },
            Err(_) => Response::text(404, "not found"),
        }
    }

    fn render(&self) -> Response {
        let page = load_snapshot(&self.snapshot_path)
            .and_then(|snapshot| render_page(&snapshot, &self.palette, &self.options));

        match page {
            Ok(html) => Response {
                status: 200,
                content_type: "text/html; charset=utf-8",
                body: html.into_bytes(),
            },
            Err(e) => Response::text(500, &e.to_string()),
        }
    }
}
