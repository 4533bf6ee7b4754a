//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::Arc;

use crate::state::AppState;

/// Collect all metrics from AppState and format as Prometheus text.
pub async fn collect_metrics(state: &Arc<AppState>) -> String {
    let mut output = String::new();

    collect_agent_metrics(state, &mut output).await;
    collect_distribution_metrics(state, &mut output).await;

    output
}

/// Collect agent and task counts.
async fn collect_agent_metrics(state: &Arc<AppState>, output: &mut String) {
    let agents = state.agent_count().await;
    let tasks = state.task_count().await;

    writeln!(
        output,
        "# HELP agentdesk_agents_registered Number of registered agents"
    )
    .ok();
    writeln!(output, "# TYPE agentdesk_agents_registered gauge").ok();
    writeln!(output, "agentdesk_agents_registered {agents}").ok();

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP agentdesk_tasks_assigned Tasks assigned across all agents"
    )
    .ok();
    writeln!(output, "# TYPE agentdesk_tasks_assigned gauge").ok();
    writeln!(output, "agentdesk_tasks_assigned {tasks}").ok();
}

/// Collect server-side distribution outcomes.
async fn collect_distribution_metrics(state: &Arc<AppState>, output: &mut String) {
    let stats = *state.distributions.read().await;

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP agentdesk_distributions_total Distribute requests by outcome"
    )
    .ok();
    writeln!(output, "# TYPE agentdesk_distributions_total counter").ok();
    writeln!(
        output,
        "agentdesk_distributions_total{{outcome=\"completed\"}} {}",
        stats.completed
    )
    .ok();
    writeln!(
        output,
        "agentdesk_distributions_total{{outcome=\"partial\"}} {}",
        stats.partial
    )
    .ok();
    writeln!(
        output,
        "agentdesk_distributions_total{{outcome=\"rejected\"}} {}",
        stats.rejected
    )
    .ok();
}
