mod backoff;
mod relay_context;
