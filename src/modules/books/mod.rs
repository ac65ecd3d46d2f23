pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use library_kernel::{settings::BooksSettings, InitCtx, Module};
use serde_json::json;

use crate::utils;
use store::BookStore;

/// Books module: owns the book store and serves it under `/books`
pub struct BooksModule {
    store: Arc<BookStore>,
}

impl BooksModule {
    pub fn new(store: BookStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn store(&self) -> &Arc<BookStore> {
        &self.store
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.store.len()?;
        let options = self.store.options();
        tracing::info!(
            target: "library::books",
            prefix = %utils::log_prefix(self.name()),
            environment = ?ctx.settings.environment,
            books,
            update_mode = ?options.update_mode,
            id_assignment = ?options.id_assignment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.store))
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book_response = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/Book" }
                    }
                }
            })
        };
        let book_body = json!({
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });
        let id_param = json!([{
            "name": "id",
            "in": "path",
            "description": "The book id",
            "required": true,
            "schema": { "type": "integer" }
        }]);
        let book_properties = json!({
            "id": {
                "type": "integer",
                "description": "Identifier of the book, as supplied on creation"
            },
            "title": { "type": "string", "description": "The title of the book" },
            "author": { "type": "string", "description": "The book author" },
            "publicationDate": {
                "type": "string",
                "format": "date",
                "description": "The date the book was published"
            },
            "genre": { "type": "string", "description": "The book genre" },
            "available": {
                "type": "boolean",
                "description": "Whether the book is available"
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Returns the list of all the books",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "The list of the books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a new book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "200": book_response("The book as stored"),
                            "400": error_response("Malformed request body"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get the book by id",
                        "tags": ["Books"],
                        "parameters": id_param.clone(),
                        "responses": {
                            "200": book_response("The book description by id"),
                            "400": error_response("The book was not found"),
                            "500": error_response("Internal server error")
                        }
                    },
                    "put": {
                        "summary": "Update the book by id",
                        "description": concat!(
                            "Answers with the submitted fields; the stored record ",
                            "is only replaced when write-back updates are enabled."
                        ),
                        "tags": ["Books"],
                        "parameters": id_param,
                        "requestBody": book_body,
                        "responses": {
                            "200": book_response("The book was updated"),
                            "400": error_response("Malformed request body"),
                            "404": error_response("The book was not found"),
                            "500": error_response("Internal server error")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "required": ["title", "author"],
                        "properties": book_properties.clone()
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": book_properties
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let books = self.store.len().unwrap_or_default();
        tracing::info!(module = self.name(), books, "books module stopped");
        Ok(())
    }
}

/// Create the books module described by the `[books]` settings section
pub fn create_module(settings: &BooksSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(BookStore::from_settings(settings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use library_kernel::settings::Settings;

    #[tokio::test]
    async fn lifecycle_hooks_succeed() {
        let module = BooksModule::new(BookStore::from_settings(&BooksSettings::default()));
        let settings = Settings::default();
        let ctx = InitCtx {
            settings: &settings,
        };

        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();
        assert_eq!(module.store().len().unwrap(), 3);
    }

    #[test]
    fn openapi_fragment_describes_every_operation() {
        let spec = create_module(&BooksSettings::default()).openapi().unwrap();

        assert!(spec["paths"]["/"]["get"].is_object());
        assert!(spec["paths"]["/"]["post"].is_object());
        assert!(spec["paths"]["/{id}"]["get"]["responses"]["400"].is_object());
        assert!(spec["paths"]["/{id}"]["put"]["responses"]["404"].is_object());
        assert_eq!(
            spec["components"]["schemas"]["Book"]["properties"]["publicationDate"]["format"],
            "date"
        );
        assert!(spec["paths"].get("/health").is_none());
    }
}
