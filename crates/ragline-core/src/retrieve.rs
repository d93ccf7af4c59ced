//! Retrieval pipeline: similarity search and answer synthesis.
//!
//! Search embeds the query and returns ranked matches. Answering
//! retrieves context the same way (optionally restricted to specific
//! documents), then asks the generation backend to answer strictly
//! from that context. Sources in the answer mirror the matches whose
//! text was included, in rank order.

use std::sync::Arc;

use crate::embedding::Embedder;
use crate::error::{Error, Result, Stage};
use crate::generation::Generator;
use crate::index::{QueryFilter, ScoredRecord, VectorIndex};
use crate::models::{AnswerReport, SearchMatch, SourceRef};

/// Matches retrieved as context for answer synthesis.
const ANSWER_TOP_K: usize = 5;

const ANSWER_SYSTEM_PROMPT: &str = "You are a technical documentation assistant. \
Answer the question accurately using only the provided context. \
If the context does not contain the information needed, state that \
the provided context is insufficient to answer.";

pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn Generator>,
}

impl RetrievalPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        RetrievalPipeline {
            embedder,
            index,
            generator,
        }
    }

    /// Top-k similarity search over the whole index.
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchMatch>> {
        let vector = self.embed_query(query).await?;
        let hits = self
            .index
            .query(&vector, top_k, None)
            .await
            .map_err(|err| Error::upstream(Stage::VectorStore, err))?;
        tracing::debug!(query, hits = hits.len(), "search complete");
        Ok(hits.into_iter().map(search_match).collect())
    }

    /// Answer a question from retrieved context. An empty result set
    /// still asks the backend, which reports the missing context.
    pub async fn answer(
        &self,
        question: &str,
        document_ids: Option<&[String]>,
    ) -> Result<AnswerReport> {
        let vector = self.embed_query(question).await?;
        let filter = document_ids
            .filter(|ids| !ids.is_empty())
            .map(|ids| QueryFilter::DocumentIds(ids.to_vec()));
        let hits = self
            .index
            .query(&vector, ANSWER_TOP_K, filter.as_ref())
            .await
            .map_err(|err| Error::upstream(Stage::VectorStore, err))?;

        let context: Vec<String> = hits
            .iter()
            .map(|hit| format!("[{}]\n{}", hit.metadata.title, hit.metadata.chunk_text))
            .collect();
        let sources: Vec<SourceRef> = hits
            .iter()
            .map(|hit| SourceRef {
                document_id: hit.metadata.document_id.clone(),
                title: hit.metadata.title.clone(),
                score: hit.score,
            })
            .collect();

        let user_prompt = format!(
            "Context:\n{}\n\nQuestion: {}\n\nAnswer the question based on the context above.",
            context.join("\n\n"),
            question
        );
        let answer = self
            .generator
            .complete(ANSWER_SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(|err| Error::upstream(Stage::Generation, err))?;
        tracing::debug!(question, context_used = context.len(), "answer synthesized");

        Ok(AnswerReport {
            question: question.to_string(),
            answer,
            sources,
            context_used: context.len(),
        })
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self
            .embedder
            .embed(&[text.to_string()])
            .await
            .map_err(|err| Error::upstream(Stage::Embedding, err))?;
        if vectors.is_empty() {
            return Err(Error::UpstreamUnavailable {
                stage: Stage::Embedding,
                detail: "backend returned no vector for the query".to_string(),
            });
        }
        Ok(vectors.remove(0))
    }
}

fn search_match(hit: ScoredRecord) -> SearchMatch {
    SearchMatch {
        document_id: hit.metadata.document_id,
        title: hit.metadata.title,
        chunk_text: hit.metadata.chunk_text,
        chunk_index: hit.metadata.chunk_index,
        score: hit.score,
    }
}
