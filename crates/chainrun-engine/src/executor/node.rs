//! Single-node execution: template resolution, prompt assembly, and the
//! retry wrapper around the Text Generation Service.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::GenerationError;
use crate::template::resolve_variables;
use crate::traits::TextGenerator;
use crate::types::{NodeDef, NodeKind, RetryConfig, RunContext};

/// Placeholder that transform/output nodes use to splice in the aggregated
/// predecessor context.
const PREVIOUS_CONTEXT_PLACEHOLDER: &str = "{{previousContext}}";

/// Instruction prepended to every generated prompt to keep completions
/// short and non-repetitive.
const BREVITY_INSTRUCTION: &str = "Be direct and concise. Respond in at most 2-3 short \
paragraphs or sentences, and do not repeat content already provided.";

/// The outcome of one node execution. Construction never fails: any
/// failure is captured in `error`, and the orchestrator decides whether to
/// halt the chain.
#[derive(Debug, Clone)]
pub struct NodeOutcome {
    pub output: Option<String>,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

/// Execute a single node against the run context.
///
/// Timing is wall clock around the whole operation, retries included.
pub async fn execute_node(
    node: &NodeDef,
    ctx: &RunContext,
    generator: &Arc<dyn TextGenerator>,
    retry: &RetryConfig,
) -> NodeOutcome {
    let started = std::time::Instant::now();

    let resolved = resolve_variables(&node.text, &ctx.variables, &ctx.outputs);

    let result = match node.kind {
        // An input node carries a value, not a generation instruction.
        NodeKind::Input => Ok(resolved),
        NodeKind::Transform | NodeKind::Output => Ok(splice_previous_context(
            resolved,
            &ctx.previous_context,
        )),
        // Llm, Merge, and anything unrecognized all generate.
        _ => {
            let prompt = build_prompt(&resolved, &ctx.previous_context);
            generate_with_retry(generator, &prompt, retry)
                .await
                .map_err(|e| e.to_string())
        }
    };

    let execution_time_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(output) => NodeOutcome {
            output: Some(output),
            error: None,
            execution_time_ms,
        },
        Err(error) => NodeOutcome {
            output: None,
            error: Some(error),
            execution_time_ms,
        },
    }
}

/// Replace the first `{{previousContext}}` occurrence with the aggregated
/// context. First occurrence only: a template with two placeholders gets
/// one filled. No context means no substitution, leaving the placeholder
/// visible downstream.
fn splice_previous_context(resolved: String, previous_context: &str) -> String {
    if previous_context.is_empty() || !resolved.contains(PREVIOUS_CONTEXT_PLACEHOLDER) {
        return resolved;
    }
    resolved.replacen(PREVIOUS_CONTEXT_PLACEHOLDER, previous_context, 1)
}

/// Assemble the final prompt for a generating node. The brevity preamble is
/// always present; the context section only when context exists.
fn build_prompt(instruction: &str, previous_context: &str) -> String {
    if previous_context.is_empty() {
        format!("{BREVITY_INSTRUCTION}\n\n{instruction}")
    } else {
        format!(
            "{BREVITY_INSTRUCTION}\n\nPrevious context:\n{previous_context}\n\n\
             Current instruction:\n{instruction}"
        )
    }
}

/// Call the generator with exponential backoff. The delay before attempt
/// `n+1` is `base_delay_ms * 2^(n-1)`. The last error wins when every
/// attempt fails.
pub async fn generate_with_retry(
    generator: &Arc<dyn TextGenerator>,
    prompt: &str,
    retry: &RetryConfig,
) -> Result<String, GenerationError> {
    let max_attempts = retry.max_attempts.max(1);
    let mut last_error = GenerationError::Provider {
        message: "no attempts made".into(),
    };

    for attempt in 1..=max_attempts {
        match generator.generate(prompt).await {
            Ok(text) => return Ok(text),
            Err(err) => {
                tracing::warn!(
                    generator = generator.name(),
                    attempt,
                    max_attempts,
                    error = %err,
                    "generation attempt failed"
                );
                last_error = err;
                if attempt < max_attempts {
                    let factor = 1u64 << (attempt - 1).min(32);
                    let delay = retry.base_delay_ms.saturating_mul(factor);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    Err(last_error)
}
