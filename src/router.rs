//! 静态路由表：URL 路径到页面的映射，根路径重定向到文件上传页。

use serde::Serialize;

/// 重定向链的最大跳数，防止配置成环。
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Page {
    FileUpload,
    UploadTest,
}

/// 页面的展示信息，只在解析到该页时才构造。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub page: Page,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub enum RouteTarget {
    Redirect(&'static str),
    Page(fn() -> PageDescriptor),
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub target: RouteTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    /// 跟随重定向之后的最终路径。
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub page: PageDescriptor,
}

fn load_file_upload() -> PageDescriptor {
    PageDescriptor {
        page: Page::FileUpload,
        title: "文件上传",
    }
}

fn load_upload_test() -> PageDescriptor {
    PageDescriptor {
        page: Page::UploadTest,
        title: "上传测试",
    }
}

const ROUTES: &[Route] = &[
    Route {
        path: "/",
        name: None,
        target: RouteTarget::Redirect("/home"),
    },
    Route {
        path: "/home",
        name: Some("Home"),
        target: RouteTarget::Page(load_file_upload),
    },
    Route {
        path: "/upload-test",
        name: Some("UploadTest"),
        target: RouteTarget::Page(load_upload_test),
    },
];

#[derive(Debug, Clone, Copy)]
pub struct Router {
    routes: &'static [Route],
}

impl Default for Router {
    fn default() -> Self {
        Self { routes: ROUTES }
    }
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &'static [Route] {
        self.routes
    }

    /// 解析一个 URL 路径；查询串、锚点与末尾的 `/` 会被忽略。
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let mut current = normalize_path(path);
        for _ in 0..=MAX_REDIRECTS {
            let route = self.routes.iter().find(|r| r.path == current)?;
            match route.target {
                RouteTarget::Redirect(to) => current = to.to_string(),
                RouteTarget::Page(load) => {
                    return Some(ResolvedRoute {
                        path: route.path,
                        name: route.name,
                        page: load(),
                    })
                }
            }
        }
        tracing::warn!(%path, "redirect limit exceeded while resolving route");
        None
    }

    pub fn by_name(&self, name: &str) -> Option<&'static Route> {
        self.routes.iter().find(|r| r.name == Some(name))
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_redirects_to_file_upload_page() {
        let resolved = Router::new().resolve("/").unwrap();
        assert_eq!(resolved.page.page, Page::FileUpload);
        assert_eq!(resolved.path, "/home");
        assert_eq!(resolved.name, Some("Home"));
    }

    #[test]
    fn paths_are_normalized() {
        let router = Router::new();
        assert_eq!(
            router.resolve("/upload-test/?from=nav").map(|r| r.page.page),
            Some(Page::UploadTest)
        );
        assert_eq!(router.resolve("").map(|r| r.page.page), Some(Page::FileUpload));
        assert_eq!(router.resolve("home#top").map(|r| r.page.page), Some(Page::FileUpload));
        assert!(router.resolve("/missing").is_none());
    }

    #[test]
    fn redirect_cycles_are_bounded() {
        const LOOP: &[Route] = &[
            Route {
                path: "/a",
                name: None,
                target: RouteTarget::Redirect("/b"),
            },
            Route {
                path: "/b",
                name: None,
                target: RouteTarget::Redirect("/a"),
            },
        ];
        assert!(Router { routes: LOOP }.resolve("/a").is_none());
    }

    #[test]
    fn lookup_by_name() {
        let route = Router::new().by_name("UploadTest").unwrap();
        assert_eq!(route.path, "/upload-test");
        assert!(Router::new().by_name("Admin").is_none());
    }
}
