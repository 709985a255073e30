use lister_core::ListingService;
use lister_core::traits::Fetcher;

/// Shared application state, available to all route handlers via `State<Arc<AppState<P, S>>>`.
pub struct AppState<P, S>
where
    P: Fetcher,
    S: Fetcher,
{
    pub service: ListingService<P, S>,
}

impl<P, S> AppState<P, S>
where
    P: Fetcher,
    S: Fetcher,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            service: ListingService::new(primary, secondary),
        }
    }
}
