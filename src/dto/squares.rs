use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dao::models::{SquareEntity, SquareStatus};

/// Payload claiming one square of the grid.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ClaimSquareRequest {
    /// Column index.
    #[validate(range(max = 9))]
    pub x: u8,
    /// Row index.
    #[validate(range(max = 9))]
    pub y: u8,
    /// User taking ownership of the square.
    pub user_id: Uuid,
}

/// Payload marking a claimed square as paid.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PaySquareRequest {
    /// Column index.
    #[validate(range(max = 9))]
    pub x: u8,
    /// Row index.
    #[validate(range(max = 9))]
    pub y: u8,
}

/// One cell of the grid as exposed over the API and the SSE feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SquareView {
    /// Square identifier.
    pub id: Uuid,
    /// Game the square belongs to.
    pub game_id: Uuid,
    /// Owner, once claimed.
    pub user_id: Option<Uuid>,
    /// Column index.
    pub x: u8,
    /// Row index.
    pub y: u8,
    /// `available`, `claimed`, or `paid`.
    #[schema(value_type = String)]
    pub status: SquareStatus,
}

impl From<SquareEntity> for SquareView {
    fn from(entity: SquareEntity) -> Self {
        Self {
            id: entity.id,
            game_id: entity.game_id,
            user_id: entity.user_id,
            x: entity.x,
            y: entity.y,
            status: entity.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_coordinates_past_the_grid_edge_fail_validation() {
        let request = ClaimSquareRequest {
            x: 10,
            y: 0,
            user_id: Uuid::new_v4(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("x"));

        let request = ClaimSquareRequest {
            x: 9,
            y: 9,
            user_id: Uuid::new_v4(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn pay_coordinates_past_the_grid_edge_fail_validation() {
        let request = PaySquareRequest { x: 0, y: 255 };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("y"));
    }
}
