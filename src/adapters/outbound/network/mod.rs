/// Network adapters for the graph store
mod graph_query_client;

pub use graph_query_client::GraphQueryClient;
