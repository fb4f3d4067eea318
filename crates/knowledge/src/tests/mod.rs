mod learn;
mod rag_ranking;
