//! Built-in sample corpus

pub const SAMPLE_CORPUS_ID: &str = "sample_data_index";
pub const SAMPLE_TITLE: &str = "English Grammar Fundamentals";
pub const SAMPLE_FILENAME: &str = "sample_english_grammar.txt";

/// Sample text indexed by `studymate sample`
pub const SAMPLE_TEXT: &str = r#"English Grammar Fundamentals: Parts of Speech and Basic Concepts

Grammar is the set of rules describing how words combine into phrases and sentences. Knowing the parts of speech makes it easier to read carefully, write clearly and explain why a sentence works.

NOUNS
A noun names a person, place, thing or idea. Common nouns are general names such as teacher, city or book. Proper nouns name something specific and start with a capital letter, for example London or Marie Curie. Abstract nouns name ideas and feelings such as freedom or happiness. Collective nouns name groups, for example team, family or flock.

VERBS
A verb expresses an action, an occurrence or a state of being, and every complete sentence needs one. Action verbs describe physical or mental activity such as run, think or write. Linking verbs such as is, are, was and become connect the subject to a description. Helping verbs such as have, will and would combine with a main verb to show tense or mood.

PRONOUNS
A pronoun stands in for a noun so that the noun does not have to be repeated. Pronouns agree with the noun they replace, called the antecedent, in number, gender and person. Personal pronouns include I, you, he, she, it, we and they. Possessive pronouns such as mine, yours and theirs show ownership. Demonstrative pronouns such as this, that, these and those point to something. Relative pronouns such as who, whom, whose and which introduce relative clauses.

ADJECTIVES
An adjective describes or modifies a noun or pronoun. Descriptive adjectives give qualities such as tall, bright or careful. Quantitative adjectives tell how much or how many, for example some, few or several. Demonstrative adjectives point to a particular noun, as in this book, and possessive adjectives such as my and their show who owns it.

ADVERBS
An adverb modifies a verb, an adjective or another adverb. Adverbs answer questions such as how, when, where and to what extent. Adverbs of manner include quickly and carefully, adverbs of time include now and yesterday, adverbs of place include here and everywhere, and adverbs of degree include very and almost.

PREPOSITIONS
A preposition shows the relationship between a noun or pronoun and another word in the sentence, usually in terms of place, time or direction. Common prepositions are in, on, at, to, from, with, by, under, between, through, during, before and after.

CONJUNCTIONS
A conjunction joins words, phrases or clauses. Coordinating conjunctions (and, but, or, nor, for, so, yet) join parts of equal rank. Subordinating conjunctions such as because, although, unless and while introduce dependent clauses. Correlative conjunctions work in pairs, for example either and or, neither and nor, both and and.

INTERJECTIONS
An interjection is a word or short phrase that expresses emotion or surprise, such as oh, wow, ouch or bravo. Interjections are often followed by an exclamation mark.

ARTICLES
Articles are a special kind of adjective that introduce nouns. The definite article "the" refers to a specific noun. The indefinite articles "a" and "an" refer to any member of a group, and "an" is used before a vowel sound.

SENTENCE STRUCTURE
A complete sentence contains at least one independent clause with a subject and a verb. A simple sentence has one independent clause: "I study English." A compound sentence joins two independent clauses with a conjunction: "I study English, and I practice every day." A complex sentence has one independent clause and at least one dependent clause: "Although I study English, I still make mistakes." A compound-complex sentence has two or more independent clauses and at least one dependent clause.

PUNCTUATION
Punctuation marks make meaning clear. A period ends a statement and a question mark ends a question. An exclamation mark shows strong feeling. A comma separates items in a list or clauses in a sentence. A colon introduces a list or an explanation, and a semicolon links two closely related independent clauses. An apostrophe shows possession or marks a contraction. Quotation marks enclose direct speech, parentheses hold extra information and a hyphen joins compound words.

Practising these concepts regularly, and noticing how the parts of speech work together in real sentences, is the quickest way to communicate more effectively in English."#;
