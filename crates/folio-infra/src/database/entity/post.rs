//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::Post;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub category_id: i64,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub description: Option<String>,
    /// JSON array of strings.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub keywords: Option<Json>,
    pub thumbnail_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn keywords_to_json(keywords: Option<Vec<String>>) -> Option<Json> {
    keywords.map(|k| Json::Array(k.into_iter().map(Json::String).collect()))
}

fn keywords_from_json(value: Option<Json>) -> Option<Vec<String>> {
    match value? {
        Json::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Json::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            title: model.title,
            slug: model.slug,
            description: model.description,
            keywords: keywords_from_json(model.keywords),
            thumbnail_url: model.thumbnail_url,
            content: model.content,
            is_published: model.is_published,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            category_id: Set(post.category_id),
            title: Set(post.title),
            slug: Set(post.slug),
            description: Set(post.description),
            keywords: Set(keywords_to_json(post.keywords)),
            thumbnail_url: Set(post.thumbnail_url),
            content: Set(post.content),
            is_published: Set(post.is_published),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
