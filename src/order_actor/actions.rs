/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Record the admin's verdict on a UPI payment. This is a paired
    /// transition: payment_status and status change together, never
    /// independently (approve -> verified/preparing, reject ->
    /// rejected/cancelled).
    ///
    /// # Errors
    /// Rejected unless the order is awaiting verification in `pending`.
    ReviewPayment { approve: bool },
}
