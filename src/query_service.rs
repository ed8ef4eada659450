// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question answering over session documents
//!
//! Ties the pipeline together: embed the question with the provider that
//! embedded the documents, retrieve the best chunks across the requested
//! documents, then hand the assembled context to an LLM. Also drives the
//! multi-document comparison flow, which answers per document and asks
//! the LLM for a comparative summary.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::documents::{DocumentError, DocumentService};
use crate::embeddings::{EmbeddingError, EmbeddingRegistry};
use crate::llm::{LlmError, LlmRegistry};
use crate::rag::errors::RagError;
use crate::rag::retrieval::{RetrievalEngine, SearchResult};

const NO_DOCUMENTS_ANSWER: &str =
    "No documents found in this session. Please upload a PDF first.";
const NO_RESULTS_ANSWER: &str = "No relevant information found in the documents.";

/// Per-document retrieval depth when answering inside a comparison
const COMPARISON_TOP_K: usize = 3;
/// Sources kept per document in a comparison entry
const COMPARISON_MAX_SOURCES: usize = 2;

/// Characters of chunk text surfaced in a source citation
const SOURCE_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Rag(#[from] RagError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A citation pointing back into an uploaded document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    pub doc_id: String,
    pub filename: String,
    pub chunk_id: String,
    /// Chunk text, truncated for display
    pub text: String,
    pub page_num: Option<u32>,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub doc_ids_used: Vec<String>,
    pub processing_time_ms: f64,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentComparison {
    pub doc_id: String,
    pub filename: String,
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub question: String,
    pub comparisons: Vec<DocumentComparison>,
    pub summary: String,
    pub processing_time_ms: f64,
}

pub struct QueryService {
    config: Arc<Config>,
    retrieval: Arc<RetrievalEngine>,
    documents: Arc<DocumentService>,
    embeddings: Arc<EmbeddingRegistry>,
    llms: Arc<LlmRegistry>,
}

impl QueryService {
    pub fn new(
        config: Arc<Config>,
        retrieval: Arc<RetrievalEngine>,
        documents: Arc<DocumentService>,
        embeddings: Arc<EmbeddingRegistry>,
        llms: Arc<LlmRegistry>,
    ) -> Self {
        Self {
            config,
            retrieval,
            documents,
            embeddings,
            llms,
        }
    }

    /// Answer a question from the session's documents
    ///
    /// `doc_ids` limits the search; `None` means every document in the
    /// session. The question is embedded with the provider recorded for
    /// the first document, since mixing providers would put query and
    /// index vectors in unrelated spaces.
    pub async fn query_documents(
        &self,
        question: &str,
        session_id: &str,
        doc_ids: Option<&[String]>,
        llm_provider: Option<&str>,
        top_k: usize,
        include_sources: bool,
    ) -> Result<QueryOutcome, QueryError> {
        let start = Instant::now();

        // An explicit empty list means the same as no list: whole session
        let doc_ids: Vec<String> = match doc_ids {
            Some(ids) if !ids.is_empty() => ids.to_vec(),
            _ => self
                .documents
                .list_by_session(session_id)
                .await?
                .into_iter()
                .map(|record| record.doc_id)
                .collect(),
        };

        if doc_ids.is_empty() {
            return Ok(QueryOutcome {
                answer: NO_DOCUMENTS_ANSWER.to_string(),
                sources: Vec::new(),
                doc_ids_used: Vec::new(),
                processing_time_ms: elapsed_ms(start),
                metadata: HashMap::from([("error".to_string(), json!("no_documents"))]),
            });
        }

        let provider_name = self
            .documents
            .get(&doc_ids[0])
            .await?
            .map(|record| record.embedding_provider);
        let embedder = self.embeddings.resolve(provider_name.as_deref())?;
        let query_vector = embedder.embed_query(question).await?;

        let results = self
            .retrieval
            .search_multi(
                &doc_ids,
                &query_vector,
                self.config.retrieval.top_k_per_document,
                top_k,
            )
            .await?;

        if results.is_empty() {
            return Ok(QueryOutcome {
                answer: NO_RESULTS_ANSWER.to_string(),
                sources: Vec::new(),
                doc_ids_used: doc_ids,
                processing_time_ms: elapsed_ms(start),
                metadata: HashMap::from([("error".to_string(), json!("no_results"))]),
            });
        }

        let filenames = self.filenames_for(&results).await;
        let context = build_context(&results, &filenames);

        let llm = self.llms.resolve(llm_provider)?;
        let answer = llm
            .generate(
                &format!("Question: {}", question),
                Some(&system_prompt(&context)),
            )
            .await?;

        let sources = if include_sources {
            build_sources(&results, &filenames)
        } else {
            Vec::new()
        };

        let mut doc_ids_used: Vec<String> = Vec::new();
        for result in &results {
            if !doc_ids_used.contains(&result.doc_id) {
                doc_ids_used.push(result.doc_id.clone());
            }
        }

        let processing_time_ms = elapsed_ms(start);
        info!(
            "Query completed: {} results, {} docs, {:.2}ms",
            results.len(),
            doc_ids_used.len(),
            processing_time_ms
        );

        Ok(QueryOutcome {
            answer,
            sources,
            doc_ids_used,
            processing_time_ms,
            metadata: HashMap::from([
                ("num_results".to_string(), json!(results.len())),
                ("llm_provider".to_string(), json!(llm.name())),
            ]),
        })
    }

    /// Ask every listed document the same question and summarize how
    /// their answers relate
    ///
    /// Documents that do not exist or belong to another session are
    /// skipped rather than failing the comparison.
    pub async fn compare_documents(
        &self,
        question: &str,
        doc_ids: &[String],
        session_id: &str,
        llm_provider: Option<&str>,
    ) -> Result<ComparisonOutcome, QueryError> {
        let start = Instant::now();

        let mut comparisons = Vec::new();
        for doc_id in doc_ids {
            let record = match self.documents.get(doc_id).await? {
                Some(record) => record,
                None => continue,
            };
            if record.session_id != session_id {
                warn!("Session {} not authorized for doc {}", session_id, doc_id);
                continue;
            }

            let outcome = self
                .query_documents(
                    question,
                    session_id,
                    Some(std::slice::from_ref(doc_id)),
                    llm_provider,
                    COMPARISON_TOP_K,
                    true,
                )
                .await?;

            comparisons.push(DocumentComparison {
                doc_id: doc_id.clone(),
                filename: record.filename,
                answer: outcome.answer,
                sources: outcome
                    .sources
                    .into_iter()
                    .take(COMPARISON_MAX_SOURCES)
                    .collect(),
            });
        }

        let llm = self.llms.resolve(llm_provider)?;
        let summary = llm
            .generate(&comparison_summary_prompt(question, &comparisons), None)
            .await?;

        let processing_time_ms = elapsed_ms(start);
        info!(
            "Comparison completed: {} documents, {:.2}ms",
            comparisons.len(),
            processing_time_ms
        );

        Ok(ComparisonOutcome {
            question: question.to_string(),
            comparisons,
            summary,
            processing_time_ms,
        })
    }

    async fn filenames_for(&self, results: &[SearchResult]) -> HashMap<String, String> {
        let mut names = HashMap::new();
        for result in results {
            if names.contains_key(&result.doc_id) {
                continue;
            }
            let filename = match self.documents.get(&result.doc_id).await {
                Ok(Some(record)) => record.filename,
                _ => "Unknown".to_string(),
            };
            names.insert(result.doc_id.clone(), filename);
        }
        names
    }
}

fn build_context(results: &[SearchResult], filenames: &HashMap<String, String>) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let filename = filenames
                .get(&result.doc_id)
                .map(String::as_str)
                .unwrap_or("Unknown");
            let page_info = result
                .page_num
                .map(|p| format!(" (Page {})", p))
                .unwrap_or_default();
            format!("[Source {} - {}{}]\n{}", i + 1, filename, page_info, result.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn system_prompt(context: &str) -> String {
    format!(
        "You are a helpful AI assistant that answers questions based on provided document excerpts.\n\
         \n\
         CONTEXT FROM DOCUMENTS:\n\
         {}\n\
         \n\
         INSTRUCTIONS:\n\
         - Answer the question based ONLY on the information provided in the context above\n\
         - If the context doesn't contain enough information to answer fully, say so\n\
         - Be specific and cite which source(s) you're using in your answer\n\
         - If multiple sources provide different information, acknowledge the differences\n\
         - Keep your answer clear and concise",
        context
    )
}

fn build_sources(
    results: &[SearchResult],
    filenames: &HashMap<String, String>,
) -> Vec<SourceRef> {
    results
        .iter()
        .map(|result| SourceRef {
            doc_id: result.doc_id.clone(),
            filename: filenames
                .get(&result.doc_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            chunk_id: result.chunk_id.clone(),
            text: truncate_chars(&result.text, SOURCE_PREVIEW_CHARS),
            page_num: result.page_num,
            score: result.score,
        })
        .collect()
}

fn comparison_summary_prompt(question: &str, comparisons: &[DocumentComparison]) -> String {
    let mut comparison_text = format!("Question: {}\n\n", question);
    for comp in comparisons {
        comparison_text.push_str(&format!("Document '{}':\n{}\n\n", comp.filename, comp.answer));
    }

    format!(
        "Compare how different documents answer the same question:\n\
         \n\
         {}\n\
         \n\
         Provide a brief summary highlighting:\n\
         1. Common themes across documents\n\
         2. Key differences or contradictions\n\
         3. Which document(s) provide the most comprehensive answer\n\
         \n\
         Keep your summary concise (3-4 sentences).",
        comparison_text
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
