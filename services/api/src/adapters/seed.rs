//! services/api/src/adapters/seed.rs
//!
//! First-run initialization: stocks the catalog and ensures the admin and
//! demo accounts exist. Runs at startup after migrations and is a no-op once
//! the catalog has products.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use tracing::info;

use crate::error::ApiError;
use grocerymart_core::domain::{Category, Role};
use grocerymart_core::ports::{AccountStore, CatalogStore, NewProduct, NewUser};

struct SeedProduct {
    name: &'static str,
    price: f64,
    offer_price: f64,
    stock: i32,
    category: Category,
    description: &'static str,
    image: &'static str,
}

const SEED_PRODUCTS: &[SeedProduct] = &[
    // Vegetables
    SeedProduct {
        name: "Fresh Tomatoes",
        price: 40.0,
        offer_price: 35.0,
        stock: 100,
        category: Category::Vegetables,
        description: "Fresh juicy tomatoes",
        image: "https://images.unsplash.com/photo-1546470427-227e5f3a8f93?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Organic Carrots",
        price: 30.0,
        offer_price: 25.0,
        stock: 80,
        category: Category::Vegetables,
        description: "Organic carrots",
        image: "https://images.unsplash.com/photo-1598170845058-32b9d6a5da37?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Fresh Spinach",
        price: 25.0,
        offer_price: 20.0,
        stock: 60,
        category: Category::Vegetables,
        description: "Fresh spinach leaves",
        image: "https://images.unsplash.com/photo-1576045057995-568f588f82fb?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Bell Peppers",
        price: 60.0,
        offer_price: 50.0,
        stock: 45,
        category: Category::Vegetables,
        description: "Colorful bell peppers",
        image: "https://images.unsplash.com/photo-1563565375-f3fdfdbefa83?w=400&h=400&fit=crop",
    },
    // Dairy
    SeedProduct {
        name: "Fresh Milk",
        price: 60.0,
        offer_price: 55.0,
        stock: 50,
        category: Category::Dairy,
        description: "Fresh whole milk",
        image: "https://images.unsplash.com/photo-1550583724-b2692b85b150?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Greek Yogurt",
        price: 120.0,
        offer_price: 100.0,
        stock: 30,
        category: Category::Dairy,
        description: "Creamy Greek yogurt",
        image: "https://images.unsplash.com/photo-1488477181946-6428a0291777?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Cheddar Cheese",
        price: 200.0,
        offer_price: 180.0,
        stock: 25,
        category: Category::Dairy,
        description: "Aged cheddar cheese",
        image: "https://images.unsplash.com/photo-1452195100486-9cc805987862?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Paneer",
        price: 180.0,
        offer_price: 160.0,
        stock: 30,
        category: Category::Dairy,
        description: "Fresh paneer",
        image: "https://images.unsplash.com/photo-1631452180519-c014fe946bc7?w=400&h=400&fit=crop",
    },
    // Fruits
    SeedProduct {
        name: "Fresh Apples",
        price: 120.0,
        offer_price: 100.0,
        stock: 70,
        category: Category::Fruits,
        description: "Crisp fresh apples",
        image: "https://images.unsplash.com/photo-1560806887-1e4cd0b6cbd6?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Ripe Bananas",
        price: 50.0,
        offer_price: 45.0,
        stock: 85,
        category: Category::Fruits,
        description: "Sweet ripe bananas",
        image: "https://images.unsplash.com/photo-1603833665858-e61d17a86224?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Strawberries",
        price: 200.0,
        offer_price: 180.0,
        stock: 35,
        category: Category::Fruits,
        description: "Fresh strawberries",
        image: "https://images.unsplash.com/photo-1464965911861-746a04b4bca6?w=400&h=400&fit=crop",
    },
    // Beverages
    SeedProduct {
        name: "Orange Juice",
        price: 80.0,
        offer_price: 70.0,
        stock: 50,
        category: Category::Beverages,
        description: "Fresh orange juice",
        image: "https://images.unsplash.com/photo-1600271886742-f049cd451bba?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Green Tea",
        price: 120.0,
        offer_price: 110.0,
        stock: 70,
        category: Category::Beverages,
        description: "Premium green tea",
        image: "https://images.unsplash.com/photo-1564890369478-c89ca6d9cde9?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Mineral Water",
        price: 20.0,
        offer_price: 18.0,
        stock: 100,
        category: Category::Beverages,
        description: "Pure mineral water",
        image: "https://images.unsplash.com/photo-1548839140-29a749e1cf4d?w=400&h=400&fit=crop",
    },
    // Grains
    SeedProduct {
        name: "Basmati Rice",
        price: 200.0,
        offer_price: 180.0,
        stock: 100,
        category: Category::Grains,
        description: "Premium basmati rice",
        image: "https://images.unsplash.com/photo-1586201375761-83865001e31c?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Oats",
        price: 120.0,
        offer_price: 110.0,
        stock: 60,
        category: Category::Grains,
        description: "Rolled oats",
        image: "https://images.unsplash.com/photo-1574635542104-830a7c7c9e9d?w=400&h=400&fit=crop",
    },
    SeedProduct {
        name: "Pasta",
        price: 120.0,
        offer_price: 110.0,
        stock: 70,
        category: Category::Grains,
        description: "Durum wheat pasta",
        image: "https://images.unsplash.com/photo-1551462147-37bd170650dc?w=400&h=400&fit=crop",
    },
];

/// Stocks an empty catalog and ensures the built-in accounts exist.
pub async fn initialize(
    catalog: &dyn CatalogStore,
    accounts: &dyn AccountStore,
) -> Result<(), ApiError> {
    let existing = catalog.count_products().await?;
    if existing > 0 {
        info!("Catalog already has {} products", existing);
        return Ok(());
    }

    info!("Initializing catalog with seed products...");
    for seed in SEED_PRODUCTS {
        catalog
            .create_product(NewProduct {
                name: seed.name.to_string(),
                price: seed.price,
                offer_price: Some(seed.offer_price),
                stock: seed.stock,
                category: seed.category,
                description: seed.description.to_string(),
                image: seed.image.to_string(),
                images: vec![seed.image.to_string()],
            })
            .await?;
    }
    info!("Catalog initialized with {} products", SEED_PRODUCTS.len());

    ensure_account(accounts, "Admin", "admin@grocerymart.com", "admin123", Role::Admin).await?;
    ensure_account(accounts, "Demo User", "demo@grocerymart.com", "demo123", Role::User).await?;

    Ok(())
}

async fn ensure_account(
    accounts: &dyn AccountStore,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<(), ApiError> {
    if accounts.find_by_email(email).await?.is_some() {
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Failed to hash seed password: {}", e)))?
        .to_string();

    accounts
        .create_user(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
        })
        .await?;
    info!("Created {} account: {}", role.as_str(), email);
    Ok(())
}
