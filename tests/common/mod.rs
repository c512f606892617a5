//! Shared fixtures for the wiremock-backed lifecycle tests.

use serde_json::{json, Value};
use wiremock::MockServer;

use nexus_provider::Provider;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin123";

/// Provider wired at a mock server.
pub async fn provider_for(server: &MockServer) -> Provider {
    Provider::configure(&json!({
        "url": server.uri(),
        "username": USERNAME,
        "password": PASSWORD,
    }))
    .expect("provider configures against mock server")
}

/// Declared plan for a maven2 proxy repository.
pub fn maven_proxy_plan(name: &str) -> Value {
    json!({
        "name": name,
        "online": true,
        "storage": {
            "blob_store_name": "default",
            "strict_content_type_validation": true
        },
        "proxy": {
            "remote_url": "https://repo1.maven.org/maven2/",
            "content_max_age": 8760,
            "metadata_max_age": 1440
        },
        "negative_cache": {"enabled": true, "time_to_live": 1440},
        "http_client": {"blocked": false, "auto_block": true},
        "maven": {
            "version_policy": "RELEASE",
            "layout_policy": "STRICT",
            "content_disposition": "ATTACHMENT"
        }
    })
}

/// Server response body for the maven2 proxy above, camelCase wire shape.
pub fn maven_proxy_api_body(server: &MockServer, name: &str) -> Value {
    json!({
        "name": name,
        "format": "maven2",
        "type": "proxy",
        "url": format!("{}/repository/{name}", server.uri()),
        "online": true,
        "storage": {
            "blobStoreName": "default",
            "strictContentTypeValidation": true
        },
        "proxy": {
            "remoteUrl": "https://repo1.maven.org/maven2/",
            "contentMaxAge": 8760,
            "metadataMaxAge": 1440
        },
        "negativeCache": {"enabled": true, "timeToLive": 1440},
        "httpClient": {"blocked": false, "autoBlock": true},
        "maven": {
            "versionPolicy": "RELEASE",
            "layoutPolicy": "STRICT",
            "contentDisposition": "ATTACHMENT"
        }
    })
}

/// Declared plan for a docker hosted repository with the write-only
/// latest_policy flag set.
pub fn docker_hosted_plan(name: &str) -> Value {
    json!({
        "name": name,
        "online": true,
        "storage": {
            "blob_store_name": "default",
            "strict_content_type_validation": true,
            "write_policy": "ALLOW",
            "latest_policy": true
        },
        "docker": {
            "force_basic_auth": true,
            "v1_enabled": false,
            "http_port": 8083
        }
    })
}

/// Server response for the docker hosted repository. The server never
/// echoes latestPolicy.
pub fn docker_hosted_api_body(server: &MockServer, name: &str) -> Value {
    json!({
        "name": name,
        "format": "docker",
        "type": "hosted",
        "url": format!("{}/repository/{name}", server.uri()),
        "online": true,
        "storage": {
            "blobStoreName": "default",
            "strictContentTypeValidation": true,
            "writePolicy": "ALLOW"
        },
        "component": {"proprietaryComponents": false},
        "docker": {
            "forceBasicAuth": true,
            "v1Enabled": false,
            "httpPort": 8083
        }
    })
}
