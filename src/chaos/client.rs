//! [`ChaosOps`] over the Kubernetes API
//!
//! Handles ChaosEngine and ChaosResult resources as dynamic objects, so no
//! Litmus CRD types need to be compiled in.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, DeleteParams, DynamicObject, ListParams, LogParams, Patch, PatchParams},
    Client,
};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::ops::ChaosOps;
use super::types::{chaos_engine_resource, chaos_result_resource, engine_status, result_verdict};
use crate::error::{DemoError, DemoResult};

const FIELD_MANAGER: &str = "litmus-demo";

#[derive(Clone)]
pub struct KubeChaosClient {
    client: Client,
}

impl KubeChaosClient {
    /// Connect using the local kubeconfig or in-cluster config
    pub async fn new() -> DemoResult<Self> {
        let client = Client::try_default().await?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn engines(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &chaos_engine_resource())
    }

    fn results(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &chaos_result_resource())
    }

    async fn get_data(&self, api: &Api<DynamicObject>, name: &str) -> DemoResult<Option<Value>> {
        Ok(api.get_opt(name).await?.map(|obj| obj.data))
    }
}

#[async_trait]
impl ChaosOps for KubeChaosClient {
    async fn delete_engine(&self, name: &str, namespace: &str) -> DemoResult<()> {
        match self
            .engines(namespace)
            .delete(name, &DeleteParams::default())
            .await
        {
            Ok(_) => {
                info!(engine = name, namespace, "Deleted ChaosEngine");
                Ok(())
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                debug!(engine = name, "ChaosEngine not present");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn apply_manifest(&self, path: &Path, namespace: &str) -> DemoResult<()> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DemoError::ManifestRead {
                path: path.to_path_buf(),
                source,
            })?;
        let obj: DynamicObject =
            serde_yaml::from_str(&text).map_err(|source| DemoError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })?;
        let name = obj
            .metadata
            .name
            .clone()
            .ok_or_else(|| DemoError::ManifestField {
                path: path.to_path_buf(),
                field: "metadata.name",
            })?;

        let params = PatchParams::apply(FIELD_MANAGER).force();
        self.engines(namespace)
            .patch(&name, &params, &Patch::Apply(&obj))
            .await?;

        info!(engine = %name, namespace, "Applied ChaosEngine");
        Ok(())
    }

    async fn engine_status(&self, name: &str, namespace: &str) -> DemoResult<Option<String>> {
        let data = self.get_data(&self.engines(namespace), name).await?;
        Ok(data
            .as_ref()
            .and_then(engine_status)
            .map(str::to_string))
    }

    async fn recent_logs(
        &self,
        selector: &str,
        namespace: &str,
        since: Duration,
    ) -> DemoResult<String> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = pods.list(&ListParams::default().labels(selector)).await?;

        let params = LogParams {
            since_seconds: Some(since.as_secs() as i64),
            ..Default::default()
        };

        let mut logs = String::new();
        for pod in list.items {
            let Some(pod_name) = pod.metadata.name else {
                continue;
            };
            match pods.logs(&pod_name, &params).await {
                Ok(text) => logs.push_str(&text),
                // Pods still initialising have no logs yet
                Err(e) => warn!(pod = %pod_name, error = %e, "Failed to fetch pod logs"),
            }
        }

        Ok(logs)
    }

    async fn describe_result(&self, name: &str, namespace: &str) -> DemoResult<String> {
        match self.results(namespace).get_opt(name).await? {
            Some(obj) => Ok(serde_yaml::to_string(&obj)?),
            None => Ok(format!("ChaosResult {}/{} not found\n", namespace, name)),
        }
    }

    async fn result_verdict(&self, name: &str, namespace: &str) -> DemoResult<Option<String>> {
        let data = self.get_data(&self.results(namespace), name).await?;
        Ok(data
            .as_ref()
            .and_then(result_verdict)
            .map(str::to_string))
    }
}
