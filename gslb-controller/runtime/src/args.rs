use crate::{
    index::{self, ClusterIndex, Index, LabelFilter, Resource},
    k8s::{self, watch, Client, Selector},
    queue::{QueueMetrics, Queues, RateLimit},
    worker, GraphSink, LogSink,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use kube::runtime::{watcher, WatchStreamExt};
use prometheus_client::registry::Registry;
use std::{fmt, num::NonZeroUsize, sync::Arc};
use tracing::{info, info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "gslb-controller",
    about = "Ingests member cluster objects for global load balancing"
)]
pub struct Args {
    #[clap(long, default_value = "gslb=info,warn", env = "GSLB_CONTROLLER_LOG")]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Kubeconfig contexts of the member clusters, comma-separated.
    #[clap(long, value_delimiter = ',', required = true)]
    member_clusters: Vec<String>,

    /// The number of key queues. Keys are assigned to a queue by hostname.
    #[clap(long, default_value = "8")]
    workers: NonZeroUsize,

    /// Keys dequeued per second from each queue. Zero disables rate limiting.
    #[clap(long, default_value = "10")]
    queue_qps: u32,

    #[clap(long, default_value = "100")]
    queue_burst: u32,

    /// Admits objects matching this label selector, e.g. `gslb=true,tier in (web,api),!canary`.
    #[clap(long)]
    object_selector: Option<Selector>,

    /// Admits all objects in namespaces with these labels.
    #[clap(long)]
    namespace_selector: Option<Selector>,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            member_clusters,
            workers,
            queue_qps,
            queue_burst,
            object_selector,
            namespace_selector,
        } = self;

        let mut prom = <Registry>::default();
        let queue_metrics = QueueMetrics::register(prom.sub_registry_with_prefix("queue"));
        let queues = Queues::new(workers.get(), RateLimit::new(queue_qps, queue_burst));

        let filter = LabelFilter::new(&member_clusters, object_selector, namespace_selector);
        let index = Index::shared(Arc::new(filter), queues.publisher(queue_metrics));
        index::metrics::register(prom.sub_registry_with_prefix("index"), index.clone());

        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        // Spawn resource watches for each member cluster.
        for context in member_clusters {
            let client = member_client(&context)
                .await
                .with_context(|| format!("failed to build a client for cluster {context}"))?;
            let cluster = ClusterIndex::new(context.as_str(), index.clone());

            spawn_watch::<k8s::Service>(&client, &cluster, "services");
            spawn_watch::<k8s::Ingress>(&client, &cluster, "ingresses");
            spawn_watch::<k8s::Namespace>(&client, &cluster, "namespaces");
            if api_resource_exists::<k8s::Route>(&client).await {
                spawn_watch::<k8s::Route>(&client, &cluster, "routes");
            } else {
                tracing::warn!(
                    cluster = %context,
                    "routes.route.openshift.io resource kind not found, skipping watches"
                );
            }
        }

        // Drain each queue into the graph layer.
        let sink: Arc<dyn GraphSink> = Arc::new(LogSink::default());
        for (i, shard) in queues.shards().iter().enumerate() {
            tokio::spawn(
                worker::run(shard.clone(), sink.clone(), runtime.shutdown_handle())
                    .instrument(info_span!("worker", shard = i)),
            );
        }
        info!(workers = queues.shards().len(), "Started");

        // Block the main thread on the shutdown signal. Once it fires, wait for the background
        // tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}

/// Builds a client for a kubeconfig context.
async fn member_client(context: &str) -> Result<Client> {
    let options = kube::config::KubeConfigOptions {
        context: Some(context.to_string()),
        ..Default::default()
    };
    let config = kube::Config::from_kubeconfig(&options).await?;
    Ok(Client::try_from(config)?)
}

fn spawn_watch<K>(client: &Client, cluster: &ClusterIndex, kind: &'static str)
where
    K: kube::Resource + Clone + fmt::Debug + serde::de::DeserializeOwned + Send + Sync + 'static,
    K::DynamicType: Default,
    Resource: From<K>,
{
    let api = kube::Api::<K>::all(client.clone());
    let events = watch::events(watcher(api, watcher::Config::default()).default_backoff());
    let span = info_span!("watch", cluster = %cluster.cluster(), kind);
    tokio::spawn(cluster.clone().run(events).instrument(span));
}

async fn api_resource_exists<T>(client: &Client) -> bool
where
    T: kube::Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    client
        .list_api_group_resources(&T::api_version(&dt))
        .await
        .ok()
        .iter()
        .flat_map(|r| r.resources.iter())
        .any(|r| r.kind == T::kind(&dt))
}
