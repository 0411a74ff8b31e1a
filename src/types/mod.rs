// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ARN confusion at compile time.

mod id;
mod identity;
mod image_ref;
mod service_name;

pub use id::{Arn, ServiceArn, TaskArn, TaskDefinitionArn};
pub use identity::{ClusterName, ServiceIdentity};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use service_name::{ServiceName, ServiceNameError};
