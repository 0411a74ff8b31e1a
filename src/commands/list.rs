// ABOUTME: Listing commands for services and task definitions.
// ABOUTME: Walks paginated ECS list queries one page at a time.

use std::pin::pin;

use ecs_deploy::config::AwsSettings;
use ecs_deploy::error::{Error, Result};
use ecs_deploy::output::Output;
use ecs_deploy::plane::{EcsPlane, pagination};
use ecs_deploy::types::ClusterName;
use futures::StreamExt;

/// Print every service ARN in `cluster`.
///
/// A failed page prints the error and whatever was fetched before it.
pub async fn services(cluster: ClusterName, aws: AwsSettings, output: &mut Output) -> Result<()> {
    let plane = EcsPlane::connect(aws).await;
    let mut pages = pagination::services(&plane, cluster);
    let mut arns = Vec::new();

    while let Some(page) = pages.next_page().await {
        match page {
            Ok(items) => arns.extend(items),
            Err(source) => {
                output.error(&source.to_string());
                output.item("Printing partial list:");
                for arn in &arns {
                    output.item(arn);
                }
                return Err(Error::PartialListing { source });
            }
        }
    }

    for arn in &arns {
        output.item(arn);
    }
    Ok(())
}

/// Print each task definition family followed by its revisions, newest first.
pub async fn taskdefs(aws: AwsSettings, output: &mut Output) -> Result<()> {
    let plane = EcsPlane::connect(aws).await;
    let mut families = pagination::families(&plane);

    while let Some(page) = families.next_page().await {
        for family in page? {
            output.item(&family);

            let mut revisions = pin!(pagination::revisions(&plane, family.as_str()).into_stream());
            while let Some(page) = revisions.next().await {
                for arn in page? {
                    output.item(&format!("  {arn}"));
                }
            }
        }
    }
    Ok(())
}
