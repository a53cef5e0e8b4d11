//! Static category vocabulary
//!
//! Categories are detected by case-insensitive substring scan of the raw
//! message against this table, and matches are reported in table order. The
//! support topics lead the table on purpose: the first match doubles as the
//! topical label for session context and holding replies.

/// Category vocabulary in scan order
pub static CATEGORY_VOCABULARY: &[&str] = &[
    // Support topics
    "account",
    "payment",
    "post",
    "feature",
    "technical",
    "password",
    "login",
    "profile",
    "email",
    "billing",
    "invoice",
    "refund",
    "subscription",
    "notification",
    "upload",
    "sharing",
    "privacy",
    "security",
    "verification",
    "settings",
    "story",
    "comment",
    "reaction",
    "follower",
    "message",
    "whiteboard",
    "poll",
    "call",
    // Technology
    "artificial intelligence",
    "machine learning",
    "deep learning",
    "neural network",
    "natural language processing",
    "computer vision",
    "quantum computing",
    "computer science",
    "programming",
    "software",
    "hardware",
    "internet",
    "blockchain",
    "cryptocurrency",
    "bitcoin",
    "virtual reality",
    "augmented reality",
    "robotics",
    "automation",
    "cybersecurity",
    "cloud computing",
    "data science",
    "big data",
    "algorithm",
    "database",
    "encryption",
    "network",
    "server",
    "browser",
    "mobile",
    "smartphone",
    "laptop",
    "wifi",
    "bluetooth",
    "operating system",
    "linux",
    "open source",
    "api",
    "nanotechnology",
    "bioinformatics",
    "semiconductor",
    "drone",
    "satellite",
    "gps",
    "3d printing",
    "streaming",
    "podcast",
    "social media",
    "search engine",
    "web development",
    "video game",
    "electric vehicle",
    "self-driving",
    "smart home",
    "wearable",
    // Science
    "physics",
    "chemistry",
    "biology",
    "mathematics",
    "astronomy",
    "geology",
    "neuroscience",
    "psychology",
    "genetics",
    "dna",
    "evolution",
    "cell",
    "bacteria",
    "virus",
    "vaccine",
    "medicine",
    "anatomy",
    "ecology",
    "climate change",
    "global warming",
    "renewable energy",
    "solar power",
    "wind energy",
    "fossil fuel",
    "photosynthesis",
    "gravity",
    "relativity",
    "black hole",
    "solar system",
    "galaxy",
    "universe",
    "planet",
    "asteroid",
    "space exploration",
    "telescope",
    "microscope",
    "periodic table",
    "molecule",
    "atom",
    "electron",
    "quantum",
    "radiation",
    "magnetism",
    "electricity",
    "thermodynamics",
    "ocean",
    "volcano",
    "earthquake",
    "weather",
    "ecosystem",
    "biodiversity",
    "species",
    "dinosaur",
    "human brain",
    "immune system",
    "nutrition",
    "metabolism",
    "hormone",
    "antibiotic",
    "surgery",
    "therapy",
    "mental health",
    "meditation",
    "fitness",
    "exercise",
    // Business and economics
    "economics",
    "economy",
    "finance",
    "investment",
    "stock market",
    "inflation",
    "interest rate",
    "banking",
    "loan",
    "mortgage",
    "insurance",
    "taxes",
    "accounting",
    "marketing",
    "advertising",
    "branding",
    "startup",
    "entrepreneur",
    "venture capital",
    "management",
    "leadership",
    "productivity",
    "supply chain",
    "logistics",
    "ecommerce",
    "retail",
    "real estate",
    "negotiation",
    "recruitment",
    "remote work",
    "freelance",
    "globalization",
    "trade",
    "manufacturing",
    "agriculture",
    "tourism",
    // General knowledge
    "history",
    "geography",
    "philosophy",
    "literature",
    "poetry",
    "language",
    "grammar",
    "music",
    "art",
    "painting",
    "photography",
    "film",
    "theater",
    "architecture",
    "design",
    "fashion",
    "culture",
    "religion",
    "mythology",
    "politics",
    "government",
    "democracy",
    "law",
    "education",
    "university",
    "sports",
    "football",
    "basketball",
    "cricket",
    "tennis",
    "olympics",
    "chess",
    "travel",
    "food",
    "cooking",
    "recipe",
    "coffee",
    "wine",
    "gardening",
    "wildlife",
    "pets",
];

/// All vocabulary terms contained in the message, in scan order
pub fn detect_categories(message: &str) -> Vec<String> {
    let lowered = message.to_lowercase();

    CATEGORY_VOCABULARY
        .iter()
        .filter(|term| lowered.contains(*term))
        .map(|term| term.to_string())
        .collect()
}
