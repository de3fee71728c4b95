//! Basic usage example for TYL Monitor Metrics
//!
//! Wires a MetricBridge to the in-memory collaborators:
//! - StaticMBeanServer plays the management-bean server
//! - InMemoryMetricRegistry plays the base and vendor registries
//! - Built-in and JSON descriptor tables drive registration

use std::sync::Arc;
use tyl_monitor_metrics::{
    AttributeValue, DescriptorTable, InMemoryMetricRegistry, MetricBridge, MetricReading,
    RegistryType, SharedMetricRegistries, StaticMBeanServer,
};

const SERVLET_BEAN: &str = "WebSphere:type=ServletStats,name=shop.CheckoutServlet";
const REST_BEAN: &str = "WebSphere:type=REST_Stats,name=shop/com.example.shop.CartResource/addItem()";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🚀 TYL Monitor Metrics - Bridge Usage Example");
    println!("=============================================");

    let server = Arc::new(
        StaticMBeanServer::new()
            .with_attribute(SERVLET_BEAN, "RequestCount", AttributeValue::from(1_204u64))
            .with_attribute(
                SERVLET_BEAN,
                "ResponseTimeDetails",
                AttributeValue::composite(vec![("total", AttributeValue::from(98_000_000u64))]),
            )
            .with_attribute(SERVLET_BEAN, "ActiveRequests", AttributeValue::from(3u64))
            .with_attribute(
                REST_BEAN,
                "ResponseTimeDetails",
                AttributeValue::composite(vec![
                    ("count", AttributeValue::from(42u64)),
                    ("total", AttributeValue::from(1_500_000_000u64)),
                ]),
            ),
    );

    let base = Arc::new(InMemoryMetricRegistry::new(RegistryType::Base));
    let vendor = Arc::new(InMemoryMetricRegistry::new(RegistryType::Vendor));
    let registries = SharedMetricRegistries::new(base.clone(), vendor.clone());

    // Example 1: built-in table picked from the bean's type key
    println!("\n📊 Registering servlet metrics from the built-in table...");
    let servlet = MetricBridge::new(SERVLET_BEAN, server.clone(), registries.clone());
    let report = servlet.create_mapped_metrics().await.unwrap_or_default();
    println!("   Label: {}", servlet.mbean_stats_name());
    println!("   Registered: {}", report.registered.len());

    // Example 2: table supplied by configuration
    println!("\n📏 Registering a configured gauge...");
    let table = DescriptorTable::from_json(
        r#"[
            {"registry": "vendor", "name": "servlet.activeRequests", "kind": "GAUGE",
             "display_name": "Active Requests", "attribute": "ActiveRequests", "tag_name": "servlet"},
            {"registry": "vendor", "name": "servlet.meter", "kind": "METER", "attribute": "RequestCount"}
        ]"#,
    )?;
    let report = servlet.create_metrics(&table).await;
    for skipped in &report.skipped {
        println!("   Skipped {}: {}", skipped.name, skipped.reason);
    }

    // Example 3: REST simple timer tagged with class and method
    println!("\n⏱️  Registering REST timer...");
    let rest = MetricBridge::new(REST_BEAN, server.clone(), registries);
    rest.create_mapped_metrics().await;

    // Example 4: read every metric, pulling live values from the beans
    println!("\n📋 Current values...");
    for (name, registry) in [("base", &base), ("vendor", &vendor)] {
        for id in registry.ids().await {
            match registry.read(&id).await? {
                MetricReading::Count(count) => println!("   [{name}] {id} = {count}"),
                MetricReading::Gauge(value) => println!("   [{name}] {id} = {value}"),
                MetricReading::SimpleTimer { count, elapsed } => {
                    println!("   [{name}] {id} = {count} calls in {elapsed:?}")
                }
            }
        }
    }

    // Example 5: tear down
    println!("\n🧹 Unregistering...");
    let servlet_teardown = servlet.unregister_metrics().await;
    let rest_teardown = rest.unregister_metrics().await;
    println!(
        "   Removed {} metrics, {} failures",
        servlet_teardown.removed.len() + rest_teardown.removed.len(),
        servlet_teardown.failed.len() + rest_teardown.failed.len()
    );

    println!("\n✅ Bridge demonstration completed!");
    Ok(())
}
