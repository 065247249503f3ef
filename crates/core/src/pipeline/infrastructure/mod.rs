pub mod sequential_pipeline_executor;
