// ABOUTME: Lazy, restartable paging over control-plane list queries.
// ABOUTME: Yields one page at a time and exposes whether more pages remain.

use async_trait::async_trait;
use futures::Stream;

use super::error::PlaneError;
use super::model::Page;
use super::traits::ControlPlane;
use crate::types::ClusterName;

/// Something that can fetch the page after a continuation token.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch(&self, token: Option<&str>) -> Result<Page<Self::Item>, PlaneError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    Next(String),
    Exhausted,
}

/// Walks a list query page by page.
///
/// Nothing is fetched until `next_page` is called. A failed fetch leaves
/// the cursor where it was, so the same page can be requested again.
pub struct Paginator<S> {
    source: S,
    cursor: Cursor,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cursor: Cursor::Start,
        }
    }

    /// Whether another page may be fetched.
    pub fn has_more(&self) -> bool {
        self.cursor != Cursor::Exhausted
    }

    /// Go back to the first page.
    pub fn restart(&mut self) {
        self.cursor = Cursor::Start;
    }

    /// Fetch the next page, or `None` once the last page has been returned.
    pub async fn next_page(&mut self) -> Option<Result<Vec<S::Item>, PlaneError>> {
        let token = match &self.cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token.as_str()),
            Cursor::Exhausted => return None,
        };

        let fetched = self.source.fetch(token).await;
        match fetched {
            Ok(page) => {
                self.cursor = match page.next_token {
                    Some(token) if !token.is_empty() => Cursor::Next(token),
                    _ => Cursor::Exhausted,
                };
                Some(Ok(page.items))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Pages as a stream that ends after the last page or the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<S::Item>, PlaneError>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut paginator = state?;
            match paginator.next_page().await? {
                Ok(items) => Some((Ok(items), Some(paginator))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

/// Service ARNs in one cluster.
pub struct ServiceArns<'a, P> {
    plane: &'a P,
    cluster: ClusterName,
}

#[async_trait]
impl<P: ControlPlane> PageSource for ServiceArns<'_, P> {
    type Item = String;

    async fn fetch(&self, token: Option<&str>) -> Result<Page<String>, PlaneError> {
        self.plane.list_services(&self.cluster, token).await
    }
}

/// Task definition family names.
pub struct Families<'a, P> {
    plane: &'a P,
}

#[async_trait]
impl<P: ControlPlane> PageSource for Families<'_, P> {
    type Item = String;

    async fn fetch(&self, token: Option<&str>) -> Result<Page<String>, PlaneError> {
        self.plane.list_task_definition_families(token).await
    }
}

/// Revision ARNs of one family, newest first.
pub struct Revisions<'a, P> {
    plane: &'a P,
    family: String,
}

#[async_trait]
impl<P: ControlPlane> PageSource for Revisions<'_, P> {
    type Item = String;

    async fn fetch(&self, token: Option<&str>) -> Result<Page<String>, PlaneError> {
        self.plane.list_task_definitions(&self.family, token).await
    }
}

pub fn services<'a, P: ControlPlane>(
    plane: &'a P,
    cluster: ClusterName,
) -> Paginator<ServiceArns<'a, P>> {
    Paginator::new(ServiceArns { plane, cluster })
}

pub fn families<P: ControlPlane>(plane: &P) -> Paginator<Families<'_, P>> {
    Paginator::new(Families { plane })
}

pub fn revisions<'a, P: ControlPlane>(
    plane: &'a P,
    family: impl Into<String>,
) -> Paginator<Revisions<'a, P>> {
    Paginator::new(Revisions {
        plane,
        family: family.into(),
    })
}
