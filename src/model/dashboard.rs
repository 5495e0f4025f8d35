use serde::Serialize;
use utoipa::ToSchema;

use crate::model::request::{Request, RequestStatus};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_requests: usize,
    pub pending_requests: usize,
    pub approved_requests: usize,
    pub rejected_requests: usize,
}

impl DashboardStats {
    pub fn from_requests(requests: &[Request]) -> Self {
        requests.iter().fold(
            DashboardStats {
                total_requests: requests.len(),
                ..Default::default()
            },
            |mut stats, request| {
                match request.status {
                    RequestStatus::Pending => stats.pending_requests += 1,
                    RequestStatus::Approved => stats.approved_requests += 1,
                    RequestStatus::Rejected => stats.rejected_requests += 1,
                }
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::request::RequestType;
    use chrono::Utc;
    use serde_json::json;

    fn request(id: u64, status: RequestStatus) -> Request {
        Request {
            id,
            user_id: 1,
            request_type: RequestType::Vacation,
            data: json!({}),
            status,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counts_partition_total() {
        let requests = vec![
            request(1, RequestStatus::Pending),
            request(2, RequestStatus::Approved),
            request(3, RequestStatus::Pending),
            request(4, RequestStatus::Rejected),
            request(5, RequestStatus::Approved),
        ];
        let stats = DashboardStats::from_requests(&requests);
        assert_eq!(stats.total_requests, requests.len());
        assert_eq!(stats.pending_requests, 2);
        assert_eq!(stats.approved_requests, 2);
        assert_eq!(stats.rejected_requests, 1);
        assert_eq!(
            stats.pending_requests + stats.approved_requests + stats.rejected_requests,
            stats.total_requests
        );
    }

    #[test]
    fn empty_list_is_all_zero() {
        assert_eq!(DashboardStats::from_requests(&[]), DashboardStats::default());
    }
}
