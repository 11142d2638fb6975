//! Category and menu item repositories.

use bistro_core::types::{CategoryId, MenuItemId, Money, Slug, Title};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{RepositoryError, like_pattern};
use crate::models::{Category, MenuItem, NewMenuItem};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    title: String,
    slug: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("category {} slug: {e}", row.id))
        })?;
        Ok(Self {
            id: CategoryId::new(row.id),
            title: Title::from_db(row.title),
            slug,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    title: String,
    price: String,
    inventory: i64,
    featured: bool,
    category_id: i64,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepositoryError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let price = Money::from_db(&row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("menu item {} price: {e}", row.id))
        })?;
        Ok(Self {
            id: MenuItemId::new(row.id),
            title: Title::from_db(row.title),
            price,
            inventory: row.inventory,
            category: CategoryId::new(row.category_id),
            featured: row.featured,
        })
    }
}

/// Repository for menu categories.
pub struct CategoryRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All categories, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, title, slug FROM categories ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    /// Get a category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, title, slug FROM categories WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    /// Get a category by its unique slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, title, slug FROM categories WHERE slug = ?",
        )
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Category::try_from).transpose()
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, title: &Title, slug: &Slug) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO categories (title, slug) VALUES (?, ?) RETURNING id, title, slug",
        )
        .bind(title.as_str())
        .bind(slug.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(map_slug_conflict)?;

        Category::try_from(row)
    }

    /// Replace a category's title and slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        title: &Title,
        slug: &Slug,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "UPDATE categories SET title = ?, slug = ? WHERE id = ? RETURNING id, title, slug",
        )
        .bind(title.as_str())
        .bind(slug.as_str())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await
        .map_err(map_slug_conflict)?;

        row.map_or(Err(RepositoryError::NotFound), Category::try_from)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if menu items still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return RepositoryError::Conflict(
                        "category is referenced by menu items".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Which column a menu item listing is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuItemSort {
    Price,
    Title,
    #[default]
    Id,
}

impl MenuItemSort {
    const fn column(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Title => "title",
            Self::Id => "id",
        }
    }
}

/// Sort field plus direction for menu item listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuItemOrdering {
    pub field: MenuItemSort,
    pub descending: bool,
}

/// Filters applied to a menu item listing.
#[derive(Debug, Clone, Default)]
pub struct MenuItemFilter {
    pub category: Option<CategoryId>,
    pub featured: Option<bool>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
}

impl MenuItemFilter {
    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(category) = self.category {
            builder.push(" AND category_id = ").push_bind(category.as_i64());
        }
        if let Some(featured) = self.featured {
            builder.push(" AND featured = ").push_bind(featured);
        }
        if let Some(search) = &self.search {
            builder
                .push(" AND title LIKE ")
                .push_bind(like_pattern(search))
                .push(" ESCAPE '\\'");
        }
    }
}

/// Repository for menu items.
pub struct MenuItemRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MenuItemRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Number of menu items matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, filter: &MenuItemFilter) -> Result<i64, RepositoryError> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM menu_items WHERE 1 = 1");
        filter.apply(&mut builder);

        let count: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// One page of menu items matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &MenuItemFilter,
        ordering: MenuItemOrdering,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MenuItem>, RepositoryError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT id, title, price, inventory, featured, category_id FROM menu_items WHERE 1 = 1",
        );
        filter.apply(&mut builder);
        builder.push(" ORDER BY ");
        builder.push(ordering.field.column());
        if ordering.descending {
            builder.push(" DESC");
        }
        // Stable tiebreak for pagination.
        builder.push(", id");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let rows: Vec<MenuItemRow> = builder.build_query_as().fetch_all(self.pool).await?;
        rows.into_iter().map(MenuItem::try_from).collect()
    }

    /// Get a menu item by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            "SELECT id, title, price, inventory, featured, category_id FROM menu_items WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(MenuItem::try_from).transpose()
    }

    /// Find a menu item by its exact title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_title(&self, title: &Title) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            "SELECT id, title, price, inventory, featured, category_id FROM menu_items WHERE title = ?",
        )
        .bind(title.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(MenuItem::try_from).transpose()
    }

    /// Create a menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, item: &NewMenuItem) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            INSERT INTO menu_items (title, price, inventory, featured, category_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, title, price, inventory, featured, category_id
            ",
        )
        .bind(item.title.as_str())
        .bind(item.price.to_string())
        .bind(item.inventory)
        .bind(item.featured)
        .bind(item.category.as_i64())
        .fetch_one(self.pool)
        .await
        .map_err(map_missing_category)?;

        MenuItem::try_from(row)
    }

    /// Replace every field of a menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the menu item does not exist.
    /// Returns `RepositoryError::Conflict` if the category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: MenuItemId,
        item: &NewMenuItem,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            UPDATE menu_items
            SET title = ?, price = ?, inventory = ?, featured = ?, category_id = ?
            WHERE id = ?
            RETURNING id, title, price, inventory, featured, category_id
            ",
        )
        .bind(item.title.as_str())
        .bind(item.price.to_string())
        .bind(item.inventory)
        .bind(item.featured)
        .bind(item.category.as_i64())
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await
        .map_err(map_missing_category)?;

        row.map_or(Err(RepositoryError::NotFound), MenuItem::try_from)
    }

    /// Delete a menu item. Cart lines referencing it are dropped by cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the menu item does not exist.
    /// Returns `RepositoryError::Conflict` if placed orders still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: MenuItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return RepositoryError::Conflict(
                        "menu item is referenced by existing orders".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

fn map_slug_conflict(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("slug already exists".to_owned());
    }
    RepositoryError::Database(err)
}

fn map_missing_category(err: sqlx::Error) -> RepositoryError {
    if is_foreign_key_violation(&err) {
        return RepositoryError::Conflict("category does not exist".to_owned());
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::db::test_pool;

    fn title(s: &str) -> Title {
        Title::parse_menu_item(s).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::parse(s.parse::<Decimal>().unwrap()).unwrap()
    }

    async fn seed_category(pool: &SqlitePool, slug: &str) -> Category {
        CategoryRepository::new(pool)
            .create(&Title::parse_category(slug).unwrap(), &Slug::parse(slug).unwrap())
            .await
            .unwrap()
    }

    async fn seed_item(pool: &SqlitePool, name: &str, price: &str, category: CategoryId) -> MenuItem {
        MenuItemRepository::new(pool)
            .create(&NewMenuItem {
                title: title(name),
                price: money(price),
                inventory: 10,
                category,
                featured: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_category_crud() {
        let pool = test_pool().await;
        let repo = CategoryRepository::new(&pool);

        let created = repo
            .create(&Title::parse_category("Main Courses").unwrap(), &Slug::parse("mains").unwrap())
            .await
            .unwrap();
        assert_eq!(created.slug.as_str(), "mains");

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(repo.get_by_slug(&created.slug).await.unwrap().unwrap(), created);

        let updated = repo
            .update(created.id, &Title::parse_category("Mains").unwrap(), &created.slug)
            .await
            .unwrap();
        assert_eq!(updated.title.as_str(), "Mains");

        repo.delete(created.id).await.unwrap();
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let pool = test_pool().await;
        let repo = CategoryRepository::new(&pool);

        seed_category(&pool, "drinks").await;
        let err = repo
            .create(&Title::parse_category("Also Drinks").unwrap(), &Slug::parse("drinks").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_referenced_category_cannot_be_deleted() {
        let pool = test_pool().await;
        let category = seed_category(&pool, "mains").await;
        seed_item(&pool, "Pasta", "9.00", category.id).await;

        let err = CategoryRepository::new(&pool).delete(category.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_menu_item_requires_existing_category() {
        let pool = test_pool().await;
        let err = MenuItemRepository::new(&pool)
            .create(&NewMenuItem {
                title: title("Ghost Dish"),
                price: money("1.00"),
                inventory: 0,
                category: CategoryId::new(999),
                featured: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_filters_and_ordering() {
        let pool = test_pool().await;
        let mains = seed_category(&pool, "mains").await;
        let drinks = seed_category(&pool, "drinks").await;
        seed_item(&pool, "Pasta", "9.00", mains.id).await;
        seed_item(&pool, "Pizza", "12.00", mains.id).await;
        seed_item(&pool, "Lemonade", "3.50", drinks.id).await;

        let repo = MenuItemRepository::new(&pool);

        let filter = MenuItemFilter {
            category: Some(mains.id),
            ..Default::default()
        };
        assert_eq!(repo.count(&filter).await.unwrap(), 2);

        let ordering = MenuItemOrdering {
            field: MenuItemSort::Price,
            descending: true,
        };
        let page = repo.list(&filter, ordering, 10, 0).await.unwrap();
        assert_eq!(page[0].title.as_str(), "Pizza");
        assert_eq!(page[1].title.as_str(), "Pasta");

        let search = MenuItemFilter {
            search: Some("pi".to_owned()),
            ..Default::default()
        };
        let found = repo.list(&search, MenuItemOrdering::default(), 10, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title.as_str(), "Pizza");
    }

    #[tokio::test]
    async fn test_pagination_window() {
        let pool = test_pool().await;
        let category = seed_category(&pool, "mains").await;
        for i in 0..4 {
            seed_item(&pool, &format!("Dish {i}"), "5.00", category.id).await;
        }

        let repo = MenuItemRepository::new(&pool);
        let filter = MenuItemFilter::default();
        let page = repo.list(&filter, MenuItemOrdering::default(), 2, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].title.as_str(), "Dish 2");
    }
}
