use crate::{
    schema::{Recipe, UserRole},
    session::SessionData,
};

const ACTION_TABLE: &[(UserRole, &[ActionType])] = &[
    (UserRole::User, &[ActionType::ManageOwnRecipes]),
    (
        UserRole::Admin,
        &[ActionType::ManageOwnRecipes, ActionType::ManageAllRecipes],
    ),
];

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    ManageOwnRecipes,
    ManageAllRecipes,
}

impl ActionType {
    pub fn authenticate(self, session: &SessionData) -> bool {
        ACTION_TABLE
            .iter()
            .find_map(|(role, actions)| {
                if &session.role != role {
                    return None;
                }

                Some(actions.contains(&self))
            })
            .unwrap_or(false)
    }
}

/// Author-or-admin check the boundary layer runs before a recipe write.
pub fn can_manage_recipe(session: &SessionData, recipe: &Recipe) -> bool {
    ActionType::ManageAllRecipes.authenticate(session)
        || (recipe.author_id == session.user_id
            && ActionType::ManageOwnRecipes.authenticate(session))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(user_id: i32, role: UserRole) -> SessionData {
        SessionData {
            user_id,
            username: format!("user{user_id}"),
            is_admin: role == UserRole::Admin,
            role,
        }
    }

    fn recipe(author_id: i32) -> Recipe {
        Recipe {
            id: 1,
            author_id,
            name: String::from("Soup"),
            image: String::new(),
            text: String::new(),
            cooking_time: 10,
        }
    }

    #[test]
    fn author_can_manage_own_recipe() {
        assert!(can_manage_recipe(&session(2, UserRole::User), &recipe(2)));
    }

    #[test]
    fn other_user_cannot_manage_recipe() {
        assert!(!can_manage_recipe(&session(3, UserRole::User), &recipe(2)));
    }

    #[test]
    fn admin_can_manage_any_recipe() {
        assert!(can_manage_recipe(&session(9, UserRole::Admin), &recipe(2)));
    }

    #[test]
    fn only_admins_manage_all_recipes() {
        assert!(!ActionType::ManageAllRecipes.authenticate(&session(1, UserRole::User)));
        assert!(ActionType::ManageAllRecipes.authenticate(&session(1, UserRole::Admin)));
    }
}
